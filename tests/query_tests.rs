use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use voxquery::{
    BlockPosition, BlockState, BoundingBox, LevelQuery, MatchMode, MemoryWorld, QueryConfig,
    ResourceLocation, StructureTemplate, WorldAccessor,
};

fn id(s: &str) -> ResourceLocation {
    ResourceLocation::parse(s).unwrap()
}

fn scattered_world(seed: u64) -> MemoryWorld {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = MemoryWorld::new();
    let kinds = ["minecraft:zombie", "minecraft:skeleton", "minecraft:cow"];
    for _ in 0..300 {
        let kind = kinds[rng.gen_range(0..kinds.len())];
        let pos = (
            rng.gen_range(-12.0..12.0),
            rng.gen_range(52.0..76.0),
            rng.gen_range(-12.0..12.0),
        );
        world.spawn_entity(id(kind), pos);
    }
    for _ in 0..400 {
        let pos = (
            rng.gen_range(-6..=6),
            rng.gen_range(58..=70),
            rng.gen_range(-6..=6),
        );
        let block = if rng.gen_bool(0.5) {
            BlockState::new("minecraft:stone")
        } else {
            BlockState::new("minecraft:furnace").with_property("lit", "true")
        };
        world.set_block(pos, block);
    }
    world
}

#[test]
fn test_entity_search_matches_brute_force() {
    let world = scattered_world(7);
    let query = LevelQuery::new(&world);
    let zombie = id("minecraft:zombie");

    for radius in 0..8u32 {
        let center = BlockPosition::new(1, 64, -2);
        let found = query.find_entities_within_radius(&zombie, center, radius);

        let bounds = BoundingBox::around(center, radius).to_aabb();
        let expected: Vec<_> = world
            .entities()
            .iter()
            .filter(|e| e.id == zombie && bounds.contains(e.position))
            .map(|e| e.handle)
            .collect();

        let handles: Vec<_> = found.iter().map(|e| e.handle).collect();
        assert_eq!(handles, expected, "radius {}", radius);
        assert!(found.len() <= world.entities().len());
    }
}

#[test]
fn test_entity_search_on_empty_world() {
    let world = MemoryWorld::new();
    let query = LevelQuery::new(&world);
    assert!(query
        .find_entities_within_radius(&id("minecraft:zombie"), BlockPosition::ORIGIN, 32)
        .is_empty());
}

#[test]
fn test_block_search_is_deterministic_and_bounded() {
    let world = scattered_world(11);
    let query = LevelQuery::new(&world);
    let target = BlockState::new("minecraft:furnace");

    for radius in [0u32, 1, 3, 6] {
        let center = BlockPosition::new(0, 64, 0);
        let first = query.find_block_within_radius(&target, center, radius, MatchMode::BlockOnly);
        let second = query.find_block_within_radius(&target, center, radius, MatchMode::BlockOnly);
        assert_eq!(first, second);

        let side = 2 * radius as usize + 1;
        assert!(first.len() <= side * side * side);

        let mut sorted = first.clone();
        sorted.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(first, sorted, "results follow x, y, z scan order");

        let bounds = BoundingBox::around(center, radius);
        for pos in &first {
            assert!(bounds.contains(*pos));
            assert_eq!(world.block_at(*pos).name, "minecraft:furnace");
        }
    }
}

#[test]
fn test_exact_state_search_is_subset_of_block_search() {
    let mut world = scattered_world(5);
    world.set_block((0, 64, 0), BlockState::new("minecraft:furnace").with_property("lit", "false"));
    let query = LevelQuery::new(&world);
    let center = BlockPosition::new(0, 64, 0);

    let lit = BlockState::new("minecraft:furnace").with_property("lit", "true");
    let any = query.find_block_within_radius(&lit, center, 6, MatchMode::BlockOnly);
    let exact = query.find_block_within_radius(&lit, center, 6, MatchMode::ExactState);

    assert!(exact.len() < any.len());
    assert!(exact.iter().all(|p| any.contains(p)));
    assert!(any.contains(&center));
    assert!(!exact.contains(&center));
}

#[test]
fn test_scan_of_radius_one_around_y64() {
    let world = MemoryWorld::new();
    let query = LevelQuery::new(&world);
    let air = BlockState::air();
    let found = query.find_block_within_radius(
        &air,
        BlockPosition::new(0, 64, 0),
        1,
        MatchMode::BlockOnly,
    );

    let mut expected = Vec::new();
    for x in -1..=1 {
        for y in 63..=65 {
            for z in -1..=1 {
                expected.push(BlockPosition::new(x, y, z));
            }
        }
    }
    assert_eq!(found, expected);
}

#[test]
fn test_sampler_is_reproducible_and_respects_build_height() {
    let world = MemoryWorld::with_build_height(60, 70);
    let query = LevelQuery::new(&world);
    let origin = BlockPosition::new(100, 64, 100);

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..1000)
            .map(|_| query.sample_random_position_detailed(origin, 5, 10, &mut rng))
            .collect::<Vec<_>>()
    };

    let first = run(0xC0FFEE);
    let second = run(0xC0FFEE);
    assert_eq!(first, second);

    let inner = BoundingBox::around(origin, 5);
    let outer = BoundingBox::around(origin, 10);
    let mut fallbacks = 0;
    for sample in &first {
        assert!(sample.attempts >= 1 && sample.attempts <= 50);
        if sample.fell_back {
            fallbacks += 1;
            continue;
        }
        assert!((60..=70).contains(&sample.position.y));
        assert!(!inner.contains(sample.position));
        assert!(outer.contains(sample.position));
    }
    // A clamped draw lands in the exclusion box about one time in five, so fifty
    // in a row does not happen in practice.
    assert_eq!(fallbacks, 0);
}

#[test]
fn test_sampler_coinciding_and_inverted_boxes_always_fall_back() {
    let world = MemoryWorld::new();
    let query = LevelQuery::new(&world);
    let origin = BlockPosition::new(100, 64, 100);
    let mut rng = StdRng::seed_from_u64(3);

    for (min, max) in [(10, 10), (12, 4), (0, 0)] {
        for _ in 0..50 {
            let sample = query.sample_random_position_detailed(origin, min, max, &mut rng);
            assert!(sample.fell_back, "min={} max={}", min, max);
            assert_eq!(sample.attempts, 50);
            // The fallback is the origin offset by the raw draw, which itself came
            // from the outer box.
            let raw = sample.position.offset(-origin.x, -origin.y, -origin.z);
            assert!(BoundingBox::around(origin, max).contains(raw));
            assert!(!BoundingBox::around(origin, max).contains(sample.position));
        }
    }
}

#[test]
fn test_sampler_with_custom_attempt_budget() {
    let world = MemoryWorld::new();
    let config = QueryConfig::from_json(r#"{ "max_sample_attempts": 3 }"#).unwrap();
    let query = LevelQuery::with_config(&world, config);
    let mut rng = StdRng::seed_from_u64(21);
    let sample =
        query.sample_random_position_detailed(BlockPosition::new(0, 64, 0), 4, 4, &mut rng);
    assert!(sample.fell_back);
    assert_eq!(sample.attempts, 3);
}

#[test]
fn test_seek_platform_on_ground() {
    let mut world = MemoryWorld::new();
    world.fill(
        BoundingBox::new((-3, 63, -3), (3, 63, 3)),
        &BlockState::new("minecraft:grass_block"),
    );
    let query = LevelQuery::new(&world);

    let is_air = |pos: BlockPosition| world.block_at(pos).is_air();
    let mut is_grass = |pos: BlockPosition| world.block_at(pos).name == "minecraft:grass_block";

    // A 3x3x3 air pocket standing on grass.
    let found = query.seek_collection_of_blocks(
        BlockPosition::new(0, 65, 0),
        1,
        is_air,
        Some(&mut is_grass),
    );
    assert_eq!(found.len(), 27);
    assert_eq!(found, BoundingBox::around((0, 65, 0), 1).positions().collect::<Vec<_>>());

    // Sunk one block into the ground: some cells are grass, nothing is returned.
    let found = query.seek_collection_of_blocks(BlockPosition::new(0, 64, 0), 1, is_air, None);
    assert!(found.is_empty());

    // Floating: the pocket is air but the cell below the center is air too.
    let found = query.seek_collection_of_blocks(
        BlockPosition::new(0, 70, 0),
        1,
        is_air,
        Some(&mut is_grass),
    );
    assert!(found.is_empty());
}

#[test]
fn test_seek_stops_at_first_failing_cell() {
    let world = MemoryWorld::new();
    let query = LevelQuery::new(&world);
    let mut calls = 0;
    let found = query.seek_collection_of_blocks(
        BlockPosition::ORIGIN,
        2,
        |_| {
            calls += 1;
            calls < 10
        },
        None,
    );
    assert!(found.is_empty());
    assert_eq!(calls, 10);
}

#[test]
fn test_spawn_and_detect_structures() {
    let mut world = MemoryWorld::new();
    world.register_template(
        id("test:well"),
        StructureTemplate::filled(
            BoundingBox::new((0, 0, 0), (2, 0, 2)),
            BlockState::new("minecraft:cobblestone"),
        ),
    );
    world.add_structure(id("minecraft:village"), BoundingBox::new((-50, 0, -50), (50, 128, 50)));

    let mut query = LevelQuery::new(&mut world);
    let origin = BlockPosition::new(10, 64, 10);
    assert!(query.spawn_structure(&id("test:well"), origin));
    assert!(query.is_structure_at_location(origin, &id("minecraft:village")));
    assert!(!query.is_structure_at_location(BlockPosition::new(60, 64, 60), &id("minecraft:village")));

    let found = query.find_block_within_radius(
        &BlockState::new("minecraft:cobblestone"),
        BlockPosition::new(11, 64, 11),
        1,
        MatchMode::BlockOnly,
    );
    assert_eq!(found.len(), 9);
    assert_eq!(world.block_count(), 9);
}

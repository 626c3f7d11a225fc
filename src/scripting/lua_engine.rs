use crate::scripting::shared::{ScriptEntity, ScriptingLevel};
use mlua::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Lua-side handle to a ScriptingLevel, using Rc<RefCell<>> for interior mutability.
struct LuaLevel(Rc<RefCell<ScriptingLevel>>);

fn positions_table(lua: &Lua, positions: &[(i32, i32, i32)]) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;
    for (i, (x, y, z)) in positions.iter().enumerate() {
        let entry = lua.create_table()?;
        entry.set("x", *x)?;
        entry.set("y", *y)?;
        entry.set("z", *z)?;
        table.set(i + 1, entry)?;
    }
    Ok(table)
}

fn entities_table(lua: &Lua, entities: &[ScriptEntity]) -> LuaResult<LuaTable> {
    let table = lua.create_table()?;
    for (i, entity) in entities.iter().enumerate() {
        let entry = lua.create_table()?;
        entry.set("handle", entity.handle)?;
        entry.set("id", entity.id.as_str())?;
        entry.set("x", entity.x)?;
        entry.set("y", entity.y)?;
        entry.set("z", entity.z)?;
        table.set(i + 1, entry)?;
    }
    Ok(table)
}

fn predicate(func: &LuaFunction) -> impl FnMut(i32, i32, i32) -> Result<bool, String> + '_ {
    move |x, y, z| func.call::<bool>((x, y, z)).map_err(|e| e.to_string())
}

impl LuaUserData for LuaLevel {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("get_seed", |_, this, ()| Ok(this.0.borrow().get_seed()));
        methods.add_method_mut("configure", |_, this, settings: String| {
            this.0
                .borrow_mut()
                .configure(&settings)
                .map_err(LuaError::external)
        });

        // -- Blocks --
        methods.add_method_mut(
            "set_block",
            |_, this, (x, y, z, name): (i32, i32, i32, String)| {
                this.0
                    .borrow_mut()
                    .set_block(x, y, z, &name)
                    .map_err(LuaError::external)
            },
        );
        methods.add_method("get_block", |_, this, (x, y, z): (i32, i32, i32)| {
            Ok(this.0.borrow().get_block(x, y, z))
        });
        methods.add_method_mut(
            "fill",
            |_,
             this,
             (min_x, min_y, min_z, max_x, max_y, max_z, block): (
                i32,
                i32,
                i32,
                i32,
                i32,
                i32,
                String,
            )| {
                this.0
                    .borrow_mut()
                    .fill((min_x, min_y, min_z), (max_x, max_y, max_z), &block)
                    .map_err(LuaError::external)
            },
        );

        // -- Entities --
        methods.add_method_mut(
            "spawn_entity",
            |_, this, (id, x, y, z, living): (String, f64, f64, f64, Option<bool>)| {
                this.0
                    .borrow_mut()
                    .spawn_entity(&id, x, y, z, living.unwrap_or(true))
                    .map_err(LuaError::external)
            },
        );
        methods.add_method(
            "find_entities_within_radius",
            |lua, this, (id, x, y, z, range): (String, i32, i32, i32, i32)| {
                let found = this
                    .0
                    .borrow()
                    .find_entities_within_radius(&id, x, y, z, range)
                    .map_err(LuaError::external)?;
                entities_table(lua, &found)
            },
        );

        // -- Block search --
        methods.add_method(
            "find_block_within_radius",
            |lua, this, (block, x, y, z, range, absolute): (String, i32, i32, i32, i32, Option<bool>)| {
                let found = this
                    .0
                    .borrow()
                    .find_block_within_radius(&block, x, y, z, range, absolute.unwrap_or(false))
                    .map_err(LuaError::external)?;
                positions_table(lua, &found)
            },
        );
        methods.add_method_mut(
            "get_random_location",
            |lua, this, (x, y, z, min, max): (i32, i32, i32, i32, i32)| {
                let (rx, ry, rz) = this
                    .0
                    .borrow_mut()
                    .get_random_location(x, y, z, min, max)
                    .map_err(LuaError::external)?;
                let t = lua.create_table()?;
                t.set("x", rx)?;
                t.set("y", ry)?;
                t.set("z", rz)?;
                Ok(t)
            },
        );
        methods.add_method(
            "seek_collection_of_blocks",
            |lua,
             this,
             (x, y, z, range, validator, below): (
                i32,
                i32,
                i32,
                i32,
                LuaFunction,
                Option<LuaFunction>,
            )| {
                let mut below_fn = below.as_ref().map(predicate);
                let below_dyn = below_fn
                    .as_mut()
                    .map(|f| f as &mut dyn FnMut(i32, i32, i32) -> Result<bool, String>);
                let found = this
                    .0
                    .borrow()
                    .seek_collection_of_blocks(x, y, z, range, predicate(&validator), below_dyn)
                    .map_err(LuaError::external)?;
                positions_table(lua, &found)
            },
        );

        // -- Structures --
        methods.add_method_mut(
            "add_structure",
            |_,
             this,
             (id, min_x, min_y, min_z, max_x, max_y, max_z): (
                String,
                i32,
                i32,
                i32,
                i32,
                i32,
                i32,
            )| {
                this.0
                    .borrow_mut()
                    .add_structure(&id, (min_x, min_y, min_z), (max_x, max_y, max_z))
                    .map_err(LuaError::external)
            },
        );
        methods.add_method_mut(
            "register_template",
            |_, this, (id, blocks): (String, LuaTable)| {
                let mut entries = Vec::new();
                for entry in blocks.sequence_values::<LuaTable>() {
                    let entry = entry?;
                    entries.push((
                        entry.get::<i32>("x")?,
                        entry.get::<i32>("y")?,
                        entry.get::<i32>("z")?,
                        entry.get::<String>("block")?,
                    ));
                }
                this.0
                    .borrow_mut()
                    .register_template(&id, entries)
                    .map_err(LuaError::external)
            },
        );
        methods.add_method_mut(
            "spawn_structure",
            |_, this, (id, x, y, z): (String, i32, i32, i32)| {
                this.0
                    .borrow_mut()
                    .spawn_structure(&id, x, y, z)
                    .map_err(LuaError::external)
            },
        );
        methods.add_method(
            "is_structure_at_location",
            |_, this, (x, y, z, id): (i32, i32, i32, String)| {
                this.0
                    .borrow()
                    .is_structure_at_location(x, y, z, &id)
                    .map_err(LuaError::external)
            },
        );
        methods.add_method(
            "get_structures_at_location",
            |lua, this, (x, y, z): (i32, i32, i32)| {
                let names = this.0.borrow().get_structures_at_location(x, y, z);
                let table = lua.create_table()?;
                for (i, name) in names.iter().enumerate() {
                    table.set(i + 1, name.as_str())?;
                }
                Ok(table)
            },
        );
    }
}

/// Set up the Lua VM with the `Level` global table providing `new()`.
fn setup_lua(lua: &Lua) -> LuaResult<()> {
    let level_table = lua.create_table()?;

    level_table.set(
        "new",
        lua.create_function(
            |_, (seed, min_y, max_y): (Option<u64>, Option<i32>, Option<i32>)| {
                let level = match (min_y, max_y) {
                    (Some(min_y), Some(max_y)) => {
                        ScriptingLevel::with_build_height(seed, min_y, max_y)
                    }
                    _ => ScriptingLevel::new(seed),
                };
                Ok(LuaLevel(Rc::new(RefCell::new(level))))
            },
        )?,
    )?;

    lua.globals().set("Level", level_table)?;
    Ok(())
}

/// Run a Lua script file. If the script assigns to the global `result`, its
/// inner ScriptingLevel is returned.
pub fn run_lua_script(path: &str) -> Result<Option<ScriptingLevel>, String> {
    let code =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read Lua script: {}", e))?;
    run_lua_code(&code)
}

/// Run Lua source code. If the code assigns to the global `result`, its
/// inner ScriptingLevel is extracted and returned.
pub fn run_lua_code(code: &str) -> Result<Option<ScriptingLevel>, String> {
    let lua = Lua::new();
    setup_lua(&lua).map_err(|e| format!("Lua setup error: {}", e))?;

    lua.load(code)
        .exec()
        .map_err(|e| format!("Lua execution error: {}", e))?;

    let result: Option<mlua::AnyUserData> = lua.globals().get("result").ok();

    match result {
        Some(ud) => {
            let ll = ud
                .borrow::<LuaLevel>()
                .map_err(|e| format!("Failed to extract result: {}", e))?;
            let cloned = ll.0.borrow().clone();
            drop(ll);
            Ok(Some(cloned))
        }
        None => Ok(None),
    }
}

/// Run Lua source code against a host-provided level, exposed to the script as
/// the global `level`. The level is handed back with whatever the script did to it.
pub fn run_lua_with_level(code: &str, level: ScriptingLevel) -> Result<ScriptingLevel, String> {
    let shared = Rc::new(RefCell::new(level));
    {
        let lua = Lua::new();
        setup_lua(&lua).map_err(|e| format!("Lua setup error: {}", e))?;
        lua.globals()
            .set("level", LuaLevel(shared.clone()))
            .map_err(|e| format!("Lua setup error: {}", e))?;

        lua.load(code)
            .exec()
            .map_err(|e| format!("Lua execution error: {}", e))?;
    }

    Ok(match Rc::try_unwrap(shared) {
        Ok(cell) => cell.into_inner(),
        Err(shared) => shared.borrow().clone(),
    })
}

use crate::scripting::shared::ScriptingLevel;
use rquickjs::{
    class::Trace, function::Opt, Array, CatchResultExt, Class, Context, Ctx, Function, JsLifetime,
    Object, Result as JsResult, Runtime,
};

#[rquickjs::class]
pub struct JsLevel {
    inner: ScriptingLevel,
}

// ScriptingLevel contains no JS values, so tracing is a no-op.
impl<'js> Trace<'js> for JsLevel {
    fn trace<'a>(&self, _tracer: rquickjs::class::Tracer<'a, 'js>) {}
}

// JsLevel has no JS lifetime; it's a purely Rust-owned type.
unsafe impl<'js> JsLifetime<'js> for JsLevel {
    type Changed<'to> = JsLevel;
}

fn make_js_err(msg: &str) -> rquickjs::Error {
    rquickjs::Error::IntoJs {
        from: "Rust",
        to: "JS",
        message: Some(msg.to_string()),
    }
}

/// JS numbers are doubles; any non-negative integer below 2^64 is a valid seed.
fn seed_from_number(seed: f64) -> JsResult<u64> {
    if seed.is_finite() && seed >= 0.0 && seed.fract() == 0.0 && seed < u64::MAX as f64 {
        Ok(seed as u64)
    } else {
        Err(make_js_err(&format!("invalid seed: {}", seed)))
    }
}

fn positions_array<'js>(ctx: &Ctx<'js>, positions: &[(i32, i32, i32)]) -> JsResult<Array<'js>> {
    let arr = Array::new(ctx.clone())?;
    for (i, (x, y, z)) in positions.iter().enumerate() {
        let obj = Object::new(ctx.clone())?;
        obj.set("x", *x)?;
        obj.set("y", *y)?;
        obj.set("z", *z)?;
        arr.set(i, obj)?;
    }
    Ok(arr)
}

fn predicate<'a, 'js>(
    ctx: &'a Ctx<'js>,
    func: &'a Function<'js>,
) -> impl FnMut(i32, i32, i32) -> Result<bool, String> + 'a + use<'a, 'js> {
    move |x, y, z| {
        func.call::<_, bool>((x, y, z))
            .catch(ctx)
            .map_err(|e| e.to_string())
    }
}

#[rquickjs::methods]
impl JsLevel {
    // -- Constructor --
    #[qjs(constructor)]
    pub fn new(seed: Opt<f64>, min_y: Opt<i32>, max_y: Opt<i32>) -> JsResult<Self> {
        let seed = seed.0.map(seed_from_number).transpose()?;
        let inner = match (min_y.0, max_y.0) {
            (Some(min_y), Some(max_y)) => ScriptingLevel::with_build_height(seed, min_y, max_y),
            _ => ScriptingLevel::new(seed),
        };
        Ok(Self { inner })
    }

    #[qjs(get, rename = "seed")]
    pub fn get_seed(&self) -> f64 {
        self.inner.get_seed() as f64
    }

    pub fn configure(&mut self, settings: String) -> JsResult<()> {
        self.inner.configure(&settings).map_err(|e| make_js_err(&e))
    }

    // -- Blocks --
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, name: String) -> JsResult<()> {
        self.inner
            .set_block(x, y, z, &name)
            .map_err(|e| make_js_err(&e))
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> String {
        self.inner.get_block(x, y, z)
    }

    pub fn fill(
        &mut self,
        min_x: i32,
        min_y: i32,
        min_z: i32,
        max_x: i32,
        max_y: i32,
        max_z: i32,
        block: String,
    ) -> JsResult<()> {
        self.inner
            .fill((min_x, min_y, min_z), (max_x, max_y, max_z), &block)
            .map_err(|e| make_js_err(&e))
    }

    // -- Entities --
    pub fn spawn_entity(
        &mut self,
        id: String,
        x: f64,
        y: f64,
        z: f64,
        living: Opt<bool>,
    ) -> JsResult<f64> {
        self.inner
            .spawn_entity(&id, x, y, z, living.0.unwrap_or(true))
            .map(|handle| handle as f64)
            .map_err(|e| make_js_err(&e))
    }

    pub fn find_entities_within_radius<'js>(
        &self,
        ctx: Ctx<'js>,
        id: String,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
    ) -> JsResult<Array<'js>> {
        let found = self
            .inner
            .find_entities_within_radius(&id, x, y, z, range)
            .map_err(|e| make_js_err(&e))?;
        let arr = Array::new(ctx.clone())?;
        for (i, entity) in found.iter().enumerate() {
            let obj = Object::new(ctx.clone())?;
            obj.set("handle", entity.handle as f64)?;
            obj.set("id", entity.id.as_str())?;
            obj.set("x", entity.x)?;
            obj.set("y", entity.y)?;
            obj.set("z", entity.z)?;
            arr.set(i, obj)?;
        }
        Ok(arr)
    }

    // -- Block search --
    pub fn find_block_within_radius<'js>(
        &self,
        ctx: Ctx<'js>,
        block: String,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
        absolute: Opt<bool>,
    ) -> JsResult<Array<'js>> {
        let found = self
            .inner
            .find_block_within_radius(&block, x, y, z, range, absolute.0.unwrap_or(false))
            .map_err(|e| make_js_err(&e))?;
        positions_array(&ctx, &found)
    }

    pub fn get_random_location<'js>(
        &mut self,
        ctx: Ctx<'js>,
        x: i32,
        y: i32,
        z: i32,
        min: i32,
        max: i32,
    ) -> JsResult<Object<'js>> {
        let (rx, ry, rz) = self
            .inner
            .get_random_location(x, y, z, min, max)
            .map_err(|e| make_js_err(&e))?;
        let obj = Object::new(ctx)?;
        obj.set("x", rx)?;
        obj.set("y", ry)?;
        obj.set("z", rz)?;
        Ok(obj)
    }

    pub fn seek_collection_of_blocks<'js>(
        &self,
        ctx: Ctx<'js>,
        x: i32,
        y: i32,
        z: i32,
        range: i32,
        validator: Function<'js>,
        below: Opt<Function<'js>>,
    ) -> JsResult<Array<'js>> {
        let mut below_fn = below.0.as_ref().map(|f| predicate(&ctx, f));
        let below_dyn = below_fn
            .as_mut()
            .map(|f| f as &mut dyn FnMut(i32, i32, i32) -> Result<bool, String>);
        let found = self
            .inner
            .seek_collection_of_blocks(x, y, z, range, predicate(&ctx, &validator), below_dyn)
            .map_err(|e| make_js_err(&e))?;
        positions_array(&ctx, &found)
    }

    // -- Structures --
    pub fn add_structure(
        &mut self,
        id: String,
        min_x: i32,
        min_y: i32,
        min_z: i32,
        max_x: i32,
        max_y: i32,
        max_z: i32,
    ) -> JsResult<()> {
        self.inner
            .add_structure(&id, (min_x, min_y, min_z), (max_x, max_y, max_z))
            .map_err(|e| make_js_err(&e))
    }

    pub fn register_template<'js>(&mut self, id: String, blocks: Array<'js>) -> JsResult<()> {
        let mut entries = Vec::new();
        for entry in blocks.iter::<Object<'js>>() {
            let entry = entry?;
            entries.push((
                entry.get::<_, i32>("x")?,
                entry.get::<_, i32>("y")?,
                entry.get::<_, i32>("z")?,
                entry.get::<_, String>("block")?,
            ));
        }
        self.inner
            .register_template(&id, entries)
            .map_err(|e| make_js_err(&e))
    }

    pub fn spawn_structure(&mut self, id: String, x: i32, y: i32, z: i32) -> JsResult<bool> {
        self.inner
            .spawn_structure(&id, x, y, z)
            .map_err(|e| make_js_err(&e))
    }

    pub fn is_structure_at_location(&self, x: i32, y: i32, z: i32, id: String) -> JsResult<bool> {
        self.inner
            .is_structure_at_location(x, y, z, &id)
            .map_err(|e| make_js_err(&e))
    }

    pub fn get_structures_at_location<'js>(
        &self,
        ctx: Ctx<'js>,
        x: i32,
        y: i32,
        z: i32,
    ) -> JsResult<Array<'js>> {
        let names = self.inner.get_structures_at_location(x, y, z);
        let arr = Array::new(ctx)?;
        for (i, name) in names.iter().enumerate() {
            arr.set(i, name.as_str())?;
        }
        Ok(arr)
    }
}

/// Register the `Level` class on the global object.
fn setup_js(ctx: &Ctx<'_>) -> JsResult<()> {
    Class::<JsLevel>::define(&ctx.globals())?;

    // Alias: expose as `Level` too (the class registers as `JsLevel`)
    let ctor: rquickjs::Value = ctx.globals().get("JsLevel")?;
    ctx.globals().set("Level", ctor)?;

    Ok(())
}

/// Run a JS script file.
pub fn run_js_script(path: &str) -> Result<Option<ScriptingLevel>, String> {
    let code =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read JS script: {}", e))?;
    run_js_code(&code)
}

/// Run JS source code. A `Level` assigned to the global `result` is returned.
pub fn run_js_code(code: &str) -> Result<Option<ScriptingLevel>, String> {
    let rt = Runtime::new().map_err(|e| format!("JS runtime error: {}", e))?;
    let ctx = Context::full(&rt).map_err(|e| format!("JS context error: {}", e))?;

    ctx.with(|ctx| {
        setup_js(&ctx).map_err(|e| format!("JS setup error: {}", e))?;

        // Pre-declare `result` so scripts can assign to it without `var`/`let`
        ctx.globals()
            .set("result", rquickjs::Value::new_undefined(ctx.clone()))
            .map_err(|e| format!("JS setup error: {}", e))?;

        ctx.eval::<(), _>(code)
            .catch(&ctx)
            .map_err(|e| format!("JS execution error: {}", e))?;

        let result: Option<Class<JsLevel>> = ctx.globals().get("result").ok();
        match result {
            Some(cls) => {
                let borrow = cls.borrow();
                let cloned = borrow.inner.clone();
                drop(borrow);
                Ok(Some(cloned))
            }
            None => Ok(None),
        }
    })
}

/// Run JS source code against a host-provided level, exposed as the global `level`.
pub fn run_js_with_level(code: &str, level: ScriptingLevel) -> Result<ScriptingLevel, String> {
    let rt = Runtime::new().map_err(|e| format!("JS runtime error: {}", e))?;
    let ctx = Context::full(&rt).map_err(|e| format!("JS context error: {}", e))?;

    ctx.with(|ctx| {
        setup_js(&ctx).map_err(|e| format!("JS setup error: {}", e))?;

        let instance = Class::instance(ctx.clone(), JsLevel { inner: level })
            .map_err(|e| format!("JS setup error: {}", e))?;
        ctx.globals()
            .set("level", instance.clone())
            .map_err(|e| format!("JS setup error: {}", e))?;

        ctx.eval::<(), _>(code)
            .catch(&ctx)
            .map_err(|e| format!("JS execution error: {}", e))?;

        let borrow = instance.borrow();
        Ok(borrow.inner.clone())
    })
}

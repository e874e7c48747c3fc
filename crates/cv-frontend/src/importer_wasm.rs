//! Browser kernel bridge: the `occt-import-js` module
//!
//! The page loads `occt-import-js.js`, which defines the global
//! `occtimportjs(options)` factory. The factory resolves to a module with
//! `ReadStepFile`, `ReadIgesFile` and `ReadBrepFile`, each taking
//! `(Uint8Array, params)` and returning the result object.

use std::cell::RefCell;

use cv_core::{CadImporter, ImportResult, ImporterError, TessellationParams};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = occtimportjs, catch)]
    fn occt_import_js(options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

thread_local! {
    static KERNEL: RefCell<Option<OcctJsImporter>> = const { RefCell::new(None) };
}

/// Initialized `occt-import-js` module
#[derive(Clone)]
pub struct OcctJsImporter {
    module: JsValue,
}

impl OcctJsImporter {
    /// Initialize the module, resolving its `.wasm` asset against `base_url`
    pub async fn load(base_url: &str) -> Result<Self, ImporterError> {
        let base = base_url.to_string();
        let locate_file = Closure::<dyn Fn(String) -> String>::new(move |path: String| {
            format!("{}{}", base, path)
        });

        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("locateFile"),
            locate_file.as_ref().unchecked_ref(),
        )
        .map_err(unavailable)?;

        let promise = occt_import_js(&options).map_err(unavailable)?;
        let module = JsFuture::from(promise).await.map_err(unavailable)?;

        // The callback is only used while the module instantiates.
        drop(locate_file);

        tracing::info!("occt-import-js initialized");
        Ok(Self { module })
    }

    /// The module for this page, initialized on first use
    pub async fn shared(base_url: &str) -> Result<Self, ImporterError> {
        if let Some(kernel) = KERNEL.with(|k| k.borrow().clone()) {
            return Ok(kernel);
        }
        let kernel = Self::load(base_url).await?;
        KERNEL.with(|k| *k.borrow_mut() = Some(kernel.clone()));
        Ok(kernel)
    }

    fn read(
        &self,
        reader: &str,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        let function = js_sys::Reflect::get(&self.module, &JsValue::from_str(reader))
            .map_err(unavailable)?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| ImporterError::Unavailable(format!("{} is not a function", reader)))?;

        let params_json =
            serde_json::to_string(params).map_err(|e| ImporterError::Kernel(e.to_string()))?;
        let params = js_sys::JSON::parse(&params_json).map_err(kernel_error)?;
        let bytes = js_sys::Uint8Array::from(data);

        let result = function
            .call2(&self.module, &bytes, &params)
            .map_err(kernel_error)?;

        let json: String = js_sys::JSON::stringify(&result)
            .map_err(kernel_error)?
            .into();
        ImportResult::from_json(&json)
            .map_err(|e| ImporterError::Kernel(format!("Malformed kernel output: {}", e)))
    }
}

impl CadImporter for OcctJsImporter {
    fn read_step(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.read("ReadStepFile", data, params)
    }

    fn read_iges(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.read("ReadIgesFile", data, params)
    }

    fn read_brep(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.read("ReadBrepFile", data, params)
    }
}

fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn unavailable(value: JsValue) -> ImporterError {
    ImporterError::Unavailable(describe(&value))
}

fn kernel_error(value: JsValue) -> ImporterError {
    ImporterError::Kernel(describe(&value))
}

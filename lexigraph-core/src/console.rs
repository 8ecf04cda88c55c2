//! Browser console logging.
//!
//! On wasm32 these go straight to `console.*`. Native builds (tests, tools)
//! drop info messages and send warnings and errors to stderr.

#[cfg(target_arch = "wasm32")]
mod imp {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console, js_name = log)]
        pub fn console_log(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = warn)]
        pub fn console_warn(s: &str);

        #[wasm_bindgen(js_namespace = console, js_name = error)]
        pub fn console_error(s: &str);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    pub fn console_log(_s: &str) {}

    pub fn console_warn(s: &str) {
        eprintln!("warning: {s}");
    }

    pub fn console_error(s: &str) {
        eprintln!("error: {s}");
    }
}

pub use imp::{console_error, console_log, console_warn};

//! Browser runtime and the code the server generates around it.

use std::path::Path;

/// Served client script; opens the notification socket.
pub const CLIENT_SCRIPT_PATH: &str = "/@flash/client.js";

/// Served hot-context runtime imported by every transformed module.
pub const HMR_RUNTIME_PATH: &str = "/@flash/hmr.js";

const CLIENT_SCRIPT: &str = include_str!("../../assets/dev/client.js");
const HMR_RUNTIME: &str = include_str!("../../assets/dev/hmr.js");
const HMR_URL_PLACEHOLDER: &str = "__FLASH_HMR_URL__";

/// Tag injected into the HTML shell.
pub const CLIENT_SCRIPT_TAG: &str = r#"<script type="module" src="/@flash/client.js"></script>"#;

/// The client script with the notification URL filled in.
pub fn client_script(hmr_url: &str) -> String {
    CLIENT_SCRIPT.replace(HMR_URL_PLACEHOLDER, &js_string(hmr_url))
}

pub fn hmr_runtime() -> &'static str {
    HMR_RUNTIME
}

/// Insert the client script tag before the last `</body>`, or append it.
///
/// A shell that already carries the tag is returned unchanged.
pub fn inject_client_script(html: &str) -> String {
    if html.contains(CLIENT_SCRIPT_TAG) {
        return html.to_string();
    }

    match html.rfind("</body>") {
        Some(pos) => {
            let mut result = String::with_capacity(html.len() + CLIENT_SCRIPT_TAG.len() + 4);
            result.push_str(&html[..pos]);
            result.push_str("  ");
            result.push_str(CLIENT_SCRIPT_TAG);
            result.push('\n');
            result.push_str(&html[pos..]);
            result
        }
        None => format!("{}\n{}\n", html.trim_end(), CLIENT_SCRIPT_TAG),
    }
}

/// One-line prelude giving a module its `import.meta.hot` context.
///
/// Has no trailing newline, so prepending it keeps every line of the module
/// (and its inline source map) where it was.
pub fn hot_prelude(module_id: &str) -> String {
    format!(
        "import {{ createHotContext as __flash_createHotContext }} from \"{}\"; \
         import.meta.hot = __flash_createHotContext({}, import.meta.url); ",
        HMR_RUNTIME_PATH,
        js_string(module_id)
    )
}

/// JS module that injects `css` as a `<style>` element keyed by the
/// stylesheet's absolute path.
///
/// Re-evaluating the module updates the same element, so the module accepts
/// its own updates.
pub fn css_module(module_id: &str, file: &Path, css: &str) -> String {
    format!(
        "{prelude}\n\
         const id = {id};\n\
         const css = {css};\n\
         let style = Array.from(document.querySelectorAll(\"style[data-flash-id]\")).find((el) => el.dataset.flashId === id);\n\
         if (!style) {{\n\
         \x20 style = document.createElement(\"style\");\n\
         \x20 style.setAttribute(\"data-flash-id\", id);\n\
         \x20 document.head.appendChild(style);\n\
         }}\n\
         style.textContent = css;\n\
         import.meta.hot.accept(() => {{}});\n\
         export default css;\n",
        prelude = hot_prelude(module_id),
        id = js_string(&file.to_string_lossy()),
        css = js_string(css),
    )
}

/// JS module whose default export is an asset's URL.
pub fn asset_url_module(url: &str) -> String {
    format!("export default {};\n", js_string(url))
}

/// Quote `value` as a JS string literal.
fn js_string(value: &str) -> String {
    // JSON strings are valid JS string literals once U+2028/U+2029 are escaped
    serde_json::Value::from(value)
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

// build.rs

//! Generates the `t!` translation macro from `locales/*.toml`.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";
const LANG_ENV: &str = "JACI_LANG";

type Translations = BTreeMap<String, String>;

fn main() {
    let lang = select_language();
    println!("cargo:rustc-env=JACI_LANG_EFFECTIVE={lang}");
    println!("cargo:rerun-if-env-changed={LANG_ENV}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let mut translations = read_locale(FALLBACK_LANG)
        .unwrap_or_else(|| panic!("locales/{FALLBACK_LANG}.toml is required"));
    if lang != FALLBACK_LANG {
        match read_locale(&lang) {
            Some(overrides) => translations.extend(overrides),
            None => println!(
                "cargo:warning=No locales/{lang}.toml, using '{FALLBACK_LANG}' strings."
            ),
        }
    }

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    fs::write(Path::new(&out_dir).join("translations.rs"), render_macro(&translations))
        .expect("translations.rs is writable");
}

/// A `lang_*` feature wins over the environment variable.
fn select_language() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_LANG_").map(str::to_lowercase))
        .collect();
    features.sort();
    if features.len() > 1 {
        println!("cargo:warning=Several lang_* features enabled {features:?}, using the first.");
    }
    features
        .into_iter()
        .next()
        .or_else(|| env::var(LANG_ENV).ok())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

fn read_locale(lang: &str) -> Option<Translations> {
    let path = format!("locales/{lang}.toml");
    let content = fs::read_to_string(&path).ok()?;
    Some(toml::from_str(&content).unwrap_or_else(|e| panic!("{path} is invalid: {e}")))
}

fn render_macro(translations: &Translations) -> String {
    let mut code =
        String::from("/// Looks up a translated string by key.\n#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in translations {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        code.push_str(&format!("    (\"{key}\") => {{ \"{escaped}\" }};\n"));
    }
    // Unknown keys are a compile error.
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    code.push('}');
    code
}

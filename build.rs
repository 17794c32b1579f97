use std::fs;
use std::path::Path;

/// Settings read from `wifi_config.h`, each overridable by an environment variable
const SETTINGS: &[(&str, &str)] = &[
    ("WIFI_SSID", "WIFI_SSID"),
    ("WIFI_PASSWORD", "WIFI_PASSWORD"),
    ("OTA_VERSION_URL", "OTA_VERSION_URL"),
    ("OTA_FIRMWARE_URL", "OTA_FIRMWARE_URL"),
    ("OTA_CHECKSUM_URL", "OTA_CHECKSUM_URL"),
];

fn main() -> anyhow::Result<()> {
    // Necessary for ESP-IDF
    embuild::espidf::sysenv::output();

    // Add crash log helper for better panic diagnostics
    println!("cargo:rustc-link-arg=-Wl,--undefined=esp_backtrace_print_app_description");

    let config_path = "wifi_config.h";
    println!("cargo:rerun-if-changed={}", config_path);

    let contents = if Path::new(config_path).exists() {
        fs::read_to_string(config_path)?
    } else {
        println!("cargo:warning=wifi_config.h not found! Copy wifi_config.h.example to wifi_config.h and add your credentials.");
        String::new()
    };

    for (define, env_name) in SETTINGS {
        println!("cargo:rerun-if-env-changed={}", env_name);

        let value = std::env::var(env_name)
            .ok()
            .or_else(|| parse_define(&contents, define))
            .unwrap_or_default();
        println!("cargo:rustc-env={}={}", env_name, value);
    }

    Ok(())
}

/// Extract the quoted value of `#define NAME "value"`
fn parse_define(contents: &str, name: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("#define"))
        .find(|l| l.split_whitespace().nth(1) == Some(name))
        .and_then(|l| l.split('"').nth(1))
        .map(str::to_string)
}

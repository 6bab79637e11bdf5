/// Keys baked into the firmware image via `option_env!` (see `config::compiled_env`).
const COMPILED_KEYS: &[&str] = &[
    "DEVICE_ID",
    "TOKEN",
    "MONGO_API",
    "PREDICTION_URL",
    "UBIDOTS_URL",
    "WIFI_SSID",
    "WIFI_PASS",
];

fn main() {
    // Rebuild when any baked-in credential changes.
    for key in COMPILED_KEYS {
        println!("cargo:rerun-if-env-changed={key}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

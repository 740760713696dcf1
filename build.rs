fn main() {
    // Only the on-target build needs the ESP-IDF environment; host test
    // builds run without `embuild`.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

fn main() {
    #[cfg(feature = "cli")]
    pkcarve::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("pkcarve: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}

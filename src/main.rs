fn main() {
    #[cfg(feature = "cli")]
    digirle::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("digirle: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}

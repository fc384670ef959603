fn main() {
    // Control log level with RUST_LOG env var:
    //   RUST_LOG=debug ffx-correlate case.db "Case One"
    //   RUST_LOG=ffx_correlate_lib::commonattr=trace ffx-correlate case.db "Case One"
    ffx_correlate_lib::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(ffx_correlate_lib::run_cli(&args));
}

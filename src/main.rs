fn main() {
    if let Err(err) = echotype_lib::run() {
        log::error!("EchoType exited with error: {err:#}");
        eprintln!("echotype: {err:#}");
        std::process::exit(1);
    }
}

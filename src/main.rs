fn main() {
    if let Err(err) = dq_workbench::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

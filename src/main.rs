use std::process;

fn main() {
    if let Err(e) = psguard::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

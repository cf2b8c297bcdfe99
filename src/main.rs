use cloudsh::Interpreter;

fn main() {
    let mut shell = Interpreter::new();
    if let Err(e) = shell.repl() {
        eprintln!("cloudsh: {:#}", e);
        std::process::exit(1);
    }
}

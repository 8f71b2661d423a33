use psh::{cli, logging, repl, State};

fn main() {
	if let Err(err) = run_main() {
		eprintln!("psh: {:#}", err);
		std::process::exit(1);
	}
}

fn run_main() -> anyhow::Result<()> {
	let args = cli::parse();
	logging::init_logging(args.log_level)?;
	let mut state = State::new(args.debug);
	repl::run(&mut state)
}

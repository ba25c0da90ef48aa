use hello_quad::CLIOpts;
use structopt::StructOpt;

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if let Err(e) = hello_quad::run(cli_opts) {
    log::error!("{}", e);
    std::process::exit(1);
  }
}

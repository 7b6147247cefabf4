use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use hubsite::build::build_site;
use hubsite::config::Config;
use hubsite::content::load_site;
use hubsite::page::static_pages;
use hubsite::serve::serve_site;
use hubsite::signup::SignupForm;
use std::net::IpAddr;
use std::path::PathBuf;

fn main() {
    if let Err(err) = main_result() {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn main_result() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let project = Arg::with_name("project")
        .long("project")
        .short("p")
        .takes_value(true)
        .value_name("DIR")
        .help("The project directory, or any directory beneath it (default: current directory)");

    let matches = App::new("hubsite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds and serves course, product and document hub sites")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders every page to the output directory")
                .arg(project.clone())
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("The output directory (default: `_output` in the project)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("serve")
                .about("Serves the site, resolving every request as it arrives")
                .arg(project.clone())
                .arg(
                    Arg::with_name("interface")
                        .long("interface")
                        .takes_value(true)
                        .default_value("127.0.0.1"),
                )
                .arg(
                    Arg::with_name("port")
                        .long("port")
                        .takes_value(true)
                        .default_value("5277"),
                ),
        )
        .subcommand(
            SubCommand::with_name("routes")
                .about("Lists every route a build writes")
                .arg(project),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(m)) => build(m),
        ("serve", Some(m)) => serve(m),
        ("routes", Some(m)) => routes(m),
        _ => Ok(()),
    }
}

fn config(m: &ArgMatches, output: Option<PathBuf>) -> Result<Config> {
    let project = match m.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    Config::from_directory(&project, output.as_deref())
}

fn build(m: &ArgMatches) -> Result<()> {
    let config = config(m, m.value_of("output").map(PathBuf::from))?;
    let output = config.output_directory.clone();
    let summary = build_site(config).context("Building site")?;
    log::info!(
        "built {} pages and {} static assets into {}",
        summary.pages,
        summary.assets,
        output.display()
    );
    Ok(())
}

fn serve(m: &ArgMatches) -> Result<()> {
    let config = config(m, None)?;
    let interface: IpAddr = m
        .value_of("interface")
        .unwrap_or("127.0.0.1")
        .parse()
        .context("Parsing --interface")?;
    let port: u16 = m
        .value_of("port")
        .unwrap_or("5277")
        .parse()
        .context("Parsing --port")?;
    serve_site(&config, interface, port)
}

fn routes(m: &ArgMatches) -> Result<()> {
    let config = config(m, None)?;
    let site = load_site(&config.content_directory).context("Loading content")?;
    let form = SignupForm::new(None);
    for page in static_pages(&site, &config.title, &form) {
        println!("{}", page.path);
    }
    Ok(())
}

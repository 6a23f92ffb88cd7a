use std::{path::Path, process};

use clap::{App, Arg};
use mmcbox::{daemon, ControlDaemon, DaemonConfig};

fn main() {
    let matches = App::new("mmcboxd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("MMC mailbox control daemon")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("foreground")
                .short("f")
                .long("foreground")
                .help("Stay in the foreground and log to stderr (for supervisors)"),
        )
        .get_matches();

    let mut config = match matches.value_of("config") {
        Some(path) => match DaemonConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("mmcboxd: {}", e);
                process::exit(1);
            }
        },
        None => DaemonConfig::default(),
    };
    config.apply_env();
    if matches.is_present("foreground") {
        config.detach = false;
    }

    // Before detaching, so the message still reaches the caller's terminal
    if let Err(e) = ControlDaemon::check_privileges() {
        eprintln!("mmcboxd: {}", e);
        process::exit(1);
    }

    if config.detach {
        if let Err(e) = daemon::daemonize() {
            eprintln!("mmcboxd: {}", e);
            process::exit(1);
        }
        let _ = syslog::init(
            syslog::Facility::LOG_DAEMON,
            log::LevelFilter::Info,
            Some("mmcboxd"),
        );
    } else {
        env_logger::init();
    }

    let mut ctrl_daemon = ControlDaemon::new(config);
    if ctrl_daemon.run().is_err() {
        process::exit(1);
    }
}

use std::process;

use clap::{App, Arg};
use mmcbox::{
    layout::{
        self,
        constants::{NUM_FRU_SLOTS, NUM_SENSORS},
    },
    DaemonConfig, Mailbox, Result,
};

const SECTIONS: &[&str] = &[
    "mmc", "sensors", "fru0", "fru1", "fru2", "fru3", "amc", "rtm", "fmc1", "fmc2", "fpga",
];

#[derive(Default)]
struct DumpEnable {
    mmc: bool,
    sensors: bool,
    fru: [bool; NUM_FRU_SLOTS],
    fpga: bool,
}

fn main() {
    env_logger::init();

    let matches = App::new("mmcbox")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dump MMC mailbox reports")
        .arg(
            Arg::with_name("sections")
                .help("Report sections to dump (all when omitted)")
                .possible_values(SECTIONS)
                .multiple(true),
        )
        .get_matches();

    let mut en = DumpEnable::default();
    match matches.values_of("sections") {
        None => {
            en = DumpEnable {
                mmc: true,
                sensors: true,
                fru: [true; NUM_FRU_SLOTS],
                fpga: true,
            };
        }
        Some(values) => {
            for value in values {
                match value {
                    "mmc" => en.mmc = true,
                    "sensors" => en.sensors = true,
                    "fru0" | "amc" => en.fru[0] = true,
                    "fru1" | "rtm" => en.fru[1] = true,
                    "fru2" | "fmc1" => en.fru[2] = true,
                    "fru3" | "fmc2" => en.fru[3] = true,
                    "fpga" => en.fpga = true,
                    _ => unreachable!("clap validates the selector set"),
                }
            }
        }
    }

    if let Err(e) = run(&en) {
        eprintln!("mmcbox: {}", e);
        process::exit(1);
    }
}

fn run(en: &DumpEnable) -> Result<()> {
    layout::verify()?;

    let mut config = DaemonConfig::default();
    config.apply_env();
    let mailbox = Mailbox::new(config.mailbox);
    mailbox.verify_region()?;

    let mut separator = Separator::default();

    if en.mmc {
        separator.next();
        dump_mmc_information(&mailbox)?;
    }
    if en.sensors {
        separator.next();
        dump_sensors(&mailbox)?;
    }
    for slot_id in 0..NUM_FRU_SLOTS {
        if !en.fru[slot_id] {
            continue;
        }
        let status = mailbox.fru_status(slot_id)?;
        separator.next();
        if status.present {
            dump_fru(&mailbox, slot_id)?;
        } else {
            println!("FRU {} not present", slot_id);
            println!("-----------------");
        }
    }
    if en.fpga {
        let ctrl = mailbox.fpga_ctrl()?;
        separator.next();
        println!(
            "FPGA control: {}Shutdown {}PCIeReset",
            flag(ctrl.req_shutdown),
            flag(ctrl.req_pcie_reset)
        );
    }
    Ok(())
}

/// Blank line between sections, none before the first
#[derive(Default)]
struct Separator {
    printed: bool,
}

impl Separator {
    fn next(&mut self) {
        if self.printed {
            println!();
        }
        self.printed = true;
    }
}

fn flag(set: bool) -> char {
    if set {
        '+'
    } else {
        '-'
    }
}

fn na(value: String) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value
    }
}

fn dump_mmc_information(mailbox: &Mailbox) -> Result<()> {
    let info = mailbox.mmc_information()?;

    println!("MMC information");
    println!("---------------");
    println!("{:<16}: {}", "App version", info.application_version);
    println!("{:<16}: {}", "Lib version", info.library_version);
    println!("{:<16}: {}", "CPLD board ver.", info.cpld_board_version);
    println!("{:<16}: {}", "CPLD lib ver.", info.cpld_library_version);
    println!("{:<16}: Rev. {}", "STAMP revision", info.hw_revision());
    println!("{:<16}: {}", "AMC slot", info.amc_slot_nr);
    println!("{:<16}: 0x{:02x}", "IPMB addr", info.ipmb_addr);
    println!("{:<16}: {}", "Board name", na(info.board_name()));
    println!("{:<16}: 0x{:04x}", "IANA Vendor ID", info.vendor_id);
    println!("{:<16}: 0x{:04x}", "IANA Product ID", info.product_id);
    println!("{:<16}: {}", "Uptime", uptime_format(info.mmc_uptime));
    Ok(())
}

fn dump_sensors(mailbox: &Mailbox) -> Result<()> {
    let sensors = mailbox.sensors(0, NUM_SENSORS)?;

    println!("MMC sensors");
    println!("-----------");
    for sensor in sensors.iter().take_while(|s| s.is_populated()) {
        println!("{:<13}: {}", sensor.name(), sensor.reading);
    }
    Ok(())
}

fn dump_fru(mailbox: &Mailbox, slot_id: usize) -> Result<()> {
    let desc = mailbox.fru_description(slot_id)?;
    let status = mailbox.fru_status(slot_id)?;

    println!("FRU {} description", slot_id);
    println!("-----------------");
    println!(
        "{:<14}: {}",
        "UID",
        desc.uid_hex().unwrap_or_else(|| "N/A".to_string())
    );
    println!("{:<14}: {}", "Manufacturer", na(desc.manufacturer()));
    println!("{:<14}: {}", "Product name", na(desc.product()));
    println!("{:<14}: {}", "Part number", na(desc.part_nr()));
    println!("{:<14}: {}", "Serial number", na(desc.serial_nr()));
    println!("{:<14}: {}", "Version", na(desc.version()));

    println!();
    println!("FRU {} status", slot_id);
    println!("-----------------");
    println!(
        "{:<14}: {}Present {}Compatible {}Powered {}Failure",
        "Flags",
        flag(status.present),
        flag(status.compatible),
        flag(status.powered),
        flag(status.failure)
    );
    for index in 0..status.num_temp_sensors as usize {
        match status.temperature_celsius(index) {
            Some(temp) => println!("Temperature {}  : {} C", index + 1, temp),
            None => println!("Temperature {}  : N/A", index + 1),
        }
    }
    Ok(())
}

fn uptime_format(total_secs: u32) -> String {
    let parts = [
        (total_secs / 86_400, "day"),
        (total_secs / 3_600 % 24, "hour"),
        (total_secs / 60 % 60, "minute"),
        (total_secs % 60, "second"),
    ];

    let mut out: Vec<String> = Vec::new();
    for (num, name) in parts {
        if num > 0 || !out.is_empty() {
            out.push(format!(
                "{} {}{}",
                num,
                name,
                if num == 1 { "" } else { "s" }
            ));
        }
    }
    if out.is_empty() {
        return "0 seconds".to_string();
    }
    out.join(", ")
}

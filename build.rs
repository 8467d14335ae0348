use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

const GPIO_FLAG_NAMES: [&str; 9] = [
    "OUTPUT",
    "INPUT",
    "ACTIVE_LOW",
    "PULL_UP",
    "PULL_DOWN",
    "OPEN_DRAIN",
    "INIT_ACTIVE",
    "INIT_INACTIVE",
    "DRIVE_FAST",
];

// log lines are formatted into fixed buffers
const MAX_NAME_LEN: usize = 32;

fn board_var(name: &str, default: &str) -> String {
    println!("cargo:rerun-if-env-changed={}", name);
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            println!("cargo:warning=Using {} from environment: {}", name, value);
            value.trim().to_owned()
        }
        _ => default.to_owned(),
    }
}

fn flags_expr(flags: &str) -> String {
    // the LED is always an output, board flags only refine it
    let mut expr = String::from("GpioFlags::OUTPUT");
    for flag in flags.split('|').map(str::trim).filter(|f| !f.is_empty()) {
        if !GPIO_FLAG_NAMES.contains(&flag) {
            panic!(
                "BOARD_LED0_FLAGS: unknown flag '{}', expected one of {:?}",
                flag, GPIO_FLAG_NAMES
            );
        }
        expr.push_str(&format!(".union(GpioFlags::{})", flag));
    }
    expr
}

fn write_board(out: &PathBuf) {
    let port = board_var("BOARD_LED0_PORT", "GPIOE");
    let pin = board_var("BOARD_LED0_PIN", "2");
    let label = board_var("BOARD_LED0_LABEL", "STAT_LED");
    let flags = board_var("BOARD_LED0_FLAGS", "");
    let console = board_var("BOARD_CONSOLE_DEVICE", "CDC_ACM_0");

    let pin: u8 = match pin.parse() {
        Ok(pin) if pin <= 15 => pin,
        _ => panic!("BOARD_LED0_PIN: '{}' is not a pin index in 0..=15", pin),
    };
    for (var, value) in [
        ("BOARD_LED0_PORT", &port),
        ("BOARD_LED0_LABEL", &label),
        ("BOARD_CONSOLE_DEVICE", &console),
    ] {
        if value.len() > MAX_NAME_LEN {
            panic!("{}: '{}' is longer than {} bytes", var, value, MAX_NAME_LEN);
        }
    }

    let mut file = File::create(out.join("board.rs")).unwrap();
    writeln!(file, "// generated by build.rs").unwrap();
    writeln!(
        file,
        "pub const LED0: LedDescriptor = LedDescriptor::new({:?}, {}, {:?}, {});",
        port,
        pin,
        label,
        flags_expr(&flags)
    )
    .unwrap();
    writeln!(file, "pub const CONSOLE_DEVICE: &str = {:?};", console).unwrap();
}

fn build_freertos(out: &PathBuf) {
    // memory layout for cortex-m-rt
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rerun-if-env-changed=FREERTOS_SRC");
    let kernel = env::var("FREERTOS_SRC").unwrap_or_else(|_| "FreeRTOS-Kernel".to_owned());

    let mut b = freertos_cargo_build::Builder::new();
    b.freertos(kernel);
    b.freertos_config("freertos");
    b.freertos_port("GCC/ARM_CM4F".to_owned());
    b.heap("heap_4.c".to_owned());
    b.compile().unwrap_or_else(|e| panic!("{}", e.to_string()));
    println!("cargo:rerun-if-changed=freertos/FreeRTOSConfig.h");
}

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());

    write_board(&out);

    // the kernel is only needed for the firmware, host tests run without it
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        build_freertos(&out);
    }

    println!("cargo:rerun-if-changed=build.rs");
}

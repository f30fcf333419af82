use cfn_log::{
    initialize, ConsoleBuffer, ConsoleTarget, EffectiveOptions, LogChannel, LoggerRegistry,
};
use log::LevelFilter;
use std::path::Path;
use tempfile::TempDir;

fn registry() -> (LoggerRegistry, ConsoleBuffer) {
    let (target, console) = ConsoleTarget::buffer();
    (LoggerRegistry::with_console(target), console)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read log file")
}

#[test]
fn debug_run_with_wire_only_creates_two_files() {
    let temp_dir = TempDir::new().expect("temp dir");
    let log_dir = temp_dir.path().join("testlogs");
    std::fs::create_dir(&log_dir).unwrap();
    let (registry, console) = registry();

    let options = EffectiveOptions::new()
        .level(LevelFilter::Debug)
        .filename("cfn-init.log")
        .log_dir(&log_dir)
        .wire_log(true)
        .cmd_log(false);
    initialize(&registry, &options).expect("initialize");

    registry.logger(LogChannel::Init).debug("Reading metadata");
    registry.logger(LogChannel::Init).flush();
    registry.logger(LogChannel::Cmd).info("yum install httpd");

    assert!(log_dir.join("cfn-init.log").is_file());
    assert!(log_dir.join("cfn-wire.log").is_file());
    assert!(!log_dir.join("cfn-init-cmd.log").exists());
    assert!(read(&log_dir.join("cfn-init.log")).contains("[DEBUG] Reading metadata"));
    assert_eq!(console.contents(), "");
}

#[test]
fn disabled_wire_log_creates_no_file_and_accepts_records() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();

    initialize(
        &registry,
        &EffectiveOptions::new().log_dir(temp_dir.path()).wire_log(false),
    )
    .expect("initialize");

    let wire = registry.logger(LogChannel::Wire);
    wire.debug("GET /?Action=DescribeStackResource");
    assert!(!wire.enabled(log::Level::Error));
    assert!(!temp_dir.path().join("cfn-wire.log").exists());
    assert!(temp_dir.path().join("cfn-init-cmd.log").is_file());
}

#[test]
fn trace_channels_ignore_the_configured_level() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();

    initialize(
        &registry,
        &EffectiveOptions::new()
            .level(LevelFilter::Warn)
            .log_dir(temp_dir.path()),
    )
    .expect("initialize");

    registry.logger(LogChannel::Init).info("filtered out");
    registry.logger(LogChannel::Wire).debug("response 200");
    registry.logger(LogChannel::Cmd).trace("exit code 0");
    registry.logger(LogChannel::Hup).warn("hook failed");

    let main = read(&temp_dir.path().join("cfn-init.log"));
    assert!(!main.contains("filtered out"));
    assert!(main.contains("[WARN] hook failed"));
    assert!(read(&temp_dir.path().join("cfn-wire.log")).contains("[DEBUG] response 200"));
    let cmd = read(&temp_dir.path().join("cfn-init-cmd.log"));
    assert!(cmd.contains(&format!("P{} [TRACE] exit code 0", std::process::id())));
}

#[test]
fn init_records_are_not_duplicated_through_root() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();
    initialize(&registry, &EffectiveOptions::new().log_dir(temp_dir.path())).expect("initialize");

    registry.logger(LogChannel::Init).info("Running config set");
    registry.logger(LogChannel::Client).info("Describing stack");

    let main = read(&temp_dir.path().join("cfn-init.log"));
    assert_eq!(main.matches("Running config set").count(), 1);
    assert_eq!(main.matches("Describing stack").count(), 1);
    assert_eq!(main.lines().count(), 2);
}

#[cfg(unix)]
#[test]
fn created_files_lose_group_and_other_write() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("temp dir");
    for name in ["cfn-init.log", "cfn-wire.log", "cfn-init-cmd.log"] {
        let path = temp_dir.path().join(name);
        std::fs::write(&path, b"").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o666)).unwrap();
    }
    let (registry, console) = registry();

    initialize(&registry, &EffectiveOptions::new().log_dir(temp_dir.path())).expect("initialize");

    for name in ["cfn-init.log", "cfn-wire.log", "cfn-init-cmd.log"] {
        let mode = std::fs::metadata(temp_dir.path().join(name))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o022, 0, "{} is group/other writable", name);
        assert_eq!(mode & 0o7777, 0o644, "{}", name);
    }
    assert_eq!(console.contents(), "");
}

#[test]
fn unopenable_primary_path_falls_back_to_console() {
    let temp_dir = TempDir::new().expect("temp dir");
    let forbidden = temp_dir.path().join("forbidden");
    let (registry, console) = registry();

    initialize(&registry, &EffectiveOptions::new().log_dir(&forbidden)).expect("initialize");

    for channel in [
        LogChannel::Root,
        LogChannel::Init,
        LogChannel::Hup,
        LogChannel::Client,
    ] {
        registry
            .logger(channel)
            .info(format!("record on {}", channel));
    }

    let text = console.contents();
    let diagnostics: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("Could not open"))
        .collect();
    assert_eq!(diagnostics.len(), 1, "{}", text);
    assert!(diagnostics[0].contains(&forbidden.join("cfn-init.log").display().to_string()));
    for channel in ["root", "init", "hup", "client"] {
        assert!(text.contains(&format!("[INFO] record on {}", channel)), "{}", text);
    }
    assert!(!forbidden.exists());
}

#[test]
fn path_collision_with_directory_falls_back() {
    let temp_dir = TempDir::new().expect("temp dir");
    std::fs::create_dir(temp_dir.path().join("cfn-init.log")).unwrap();
    let (registry, console) = registry();

    initialize(
        &registry,
        &EffectiveOptions::new().quiet(true).log_dir(temp_dir.path()),
    )
    .expect("initialize");

    registry.logger(LogChannel::Root).error("console only");
    assert!(console.contents().contains("[ERROR] console only"));
    assert!(!temp_dir.path().join("cfn-wire.log").exists());
}

#[test]
fn diagnostic_names_the_primary_file_when_a_trace_file_fails() {
    let temp_dir = TempDir::new().expect("temp dir");
    std::fs::create_dir(temp_dir.path().join("cfn-wire.log")).unwrap();
    let (registry, console) = registry();

    initialize(&registry, &EffectiveOptions::new().log_dir(temp_dir.path())).expect("initialize");

    let text = console.contents();
    let expected = format!(
        "Could not open {} for logging. Using stderr instead.",
        temp_dir.path().join("cfn-init.log").display()
    );
    assert_eq!(text.lines().next(), Some(expected.as_str()), "{}", text);
    assert!(!text.contains("cfn-wire.log"), "{}", text);
}

#[test]
fn debug_level_records_the_configuration_summary() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();

    initialize(
        &registry,
        &EffectiveOptions::new()
            .level(LevelFilter::Debug)
            .log_dir(temp_dir.path())
            .cmd_log(false),
    )
    .expect("initialize");
    registry.logger(LogChannel::Root).flush();

    let main = read(&temp_dir.path().join("cfn-init.log"));
    assert!(main.contains("[DEBUG] logging configured with 2 log file(s)"), "{}", main);
}

#[test]
fn reinitializing_replaces_previous_files() {
    let first = TempDir::new().expect("temp dir");
    let second = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();

    initialize(&registry, &EffectiveOptions::new().log_dir(first.path())).expect("first");
    registry.logger(LogChannel::Root).info("first run");
    initialize(&registry, &EffectiveOptions::new().log_dir(second.path())).expect("second");
    registry.logger(LogChannel::Root).info("second run");

    assert!(!read(&first.path().join("cfn-init.log")).contains("second run"));
    assert!(read(&second.path().join("cfn-init.log")).contains("[INFO] second run"));
}

#[test]
fn primary_file_rotates_past_five_mebibytes() {
    let temp_dir = TempDir::new().expect("temp dir");
    let (registry, _console) = registry();
    initialize(
        &registry,
        &EffectiveOptions::new()
            .log_dir(temp_dir.path())
            .wire_log(false)
            .cmd_log(false),
    )
    .expect("initialize");

    let line = "x".repeat(1024);
    let logger = registry.logger(LogChannel::Root);
    for _ in 0..6 * 1024 {
        logger.info(&line);
    }
    logger.flush();

    let backup = std::fs::read_to_string(temp_dir.path().join("cfn-init.log.1")).unwrap();
    assert!(backup.ends_with('\n'));
    assert!(backup.lines().all(|l| l.ends_with(&line)));
    let current = std::fs::metadata(temp_dir.path().join("cfn-init.log")).unwrap();
    assert!(current.len() <= 5 * 1024 * 1024);
}

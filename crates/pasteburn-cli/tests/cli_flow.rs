use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rusqlite::Connection;
use tempfile::TempDir;

const EXIT_NOT_FOUND: i32 = 3;
const EXIT_INVALID_INPUT: i32 = 4;
const EXIT_AUTH_FAILED: i32 = 5;
const EXIT_INTEGRITY_FAILED: i32 = 6;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pasteburn"))
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir should be created"),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("pasteburn").join("config.toml")
    }

    fn store_path(&self) -> PathBuf {
        self.dir.path().join("data").join("pastes.db")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env_remove("PASTEBURN_CONFIG")
            .env_remove("PASTEBURN_PASSWORD")
            .env_remove("PASTEBURN_MASTER_KEY")
            .env_remove("PASTEBURN_KEY_HASH")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("pasteburn should run")
    }

    fn run_with_stdin(&self, args: &[&str], input: &[u8]) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("pasteburn should spawn");
        child
            .stdin
            .take()
            .expect("stdin should be piped")
            .write_all(input)
            .expect("stdin should accept input");
        child.wait_with_output().expect("pasteburn should finish")
    }

    fn init(&self, extra: &[&str]) {
        let store = self.store_path();
        let mut args = vec!["init", "--host", "paste.example.org", "--store"];
        args.push(store.to_str().unwrap());
        args.extend_from_slice(extra);
        let output = self.run(&args);
        assert_success(&output);
    }

    fn put(&self, content: &[u8], args: &[&str]) -> String {
        let mut full = vec!["put"];
        full.extend_from_slice(args);
        let output = self.run_with_stdin(&full, content);
        assert_success(&output);
        stdout(&output).trim().to_string()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "status: {:?}\nstdout: {}\nstderr: {}",
        output.status,
        stdout(output),
        stderr(output)
    );
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "stdout: {}\nstderr: {}",
        stdout(output),
        stderr(output)
    );
}

fn id_from_url(url: &str) -> String {
    assert!(url.starts_with("https://paste.example.org/"), "{}", url);
    url.rsplit('/').next().unwrap().to_string()
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
fn test_init_writes_private_config_and_store() {
    let sandbox = Sandbox::new();
    let store = sandbox.store_path();
    let output = sandbox.run(&[
        "init",
        "--host",
        "paste.example.org",
        "--store",
        store.to_str().unwrap(),
    ]);
    assert_success(&output);

    let text = stdout(&output);
    assert!(text.contains("Initialized pasteburn"));
    assert!(text.contains("age1"));
    assert!(sandbox.config_path().exists());
    assert!(store.exists());

    let config = std::fs::read_to_string(sandbox.config_path()).unwrap();
    assert!(config.contains("AGE-SECRET-KEY-1"));
    #[cfg(unix)]
    assert_eq!(mode_of(&sandbox.config_path()), 0o600);
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    let before = std::fs::read_to_string(sandbox.config_path()).unwrap();

    let output = sandbox.run(&["init"]);
    assert_exit(&output, EXIT_INVALID_INPUT);
    assert!(stderr(&output).contains("--force"));
    assert_eq!(std::fs::read_to_string(sandbox.config_path()).unwrap(), before);

    let output = sandbox.run(&["init", "--force", "--store", sandbox.store_path().to_str().unwrap()]);
    assert_success(&output);
    assert_ne!(std::fs::read_to_string(sandbox.config_path()).unwrap(), before);
}

#[test]
fn test_missing_config_points_at_init() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["purge"]);
    assert_exit(&output, EXIT_NOT_FOUND);
    assert!(stderr(&output).contains("pasteburn init"));
}

#[test]
fn test_put_then_get_round_trip() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);

    let url = sandbox.put(b"hello from stdin\n", &[]);
    let id = id_from_url(&url);

    let output = sandbox.run(&["get", &id, "--raw"]);
    assert_success(&output);
    assert_eq!(output.stdout, b"hello from stdin\n");

    // Default lifetime: reading twice is fine
    let output = sandbox.run(&["get", &url]);
    assert_success(&output);
    assert_eq!(stdout(&output), "hello from stdin\n");
}

#[test]
fn test_put_reads_file_and_emits_json() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    let file = sandbox.dir.path().join("note.txt");
    std::fs::write(&file, "from a file").unwrap();

    let output = sandbox.run(&["put", file.to_str().unwrap(), "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["status"], "published");
    let id = value["id"].as_str().unwrap().to_string();

    let output = sandbox.run(&["get", &id, "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["id"], id.as_str());
    assert_eq!(value["content"], "from a file");
}

#[test]
fn test_missing_file_is_invalid_input() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    let output = sandbox.run(&["put", "/nonexistent/pasteburn/input"]);
    assert_exit(&output, EXIT_INVALID_INPUT);
}

#[test]
fn test_burn_after_read_is_gone_on_second_get() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);

    let id = id_from_url(&sandbox.put(b"read me once", &["--expire-hours", "0"]));

    let output = sandbox.run(&["get", &id, "--raw"]);
    assert_success(&output);
    assert_eq!(output.stdout, b"read me once");

    let output = sandbox.run(&["get", &id]);
    assert_exit(&output, EXIT_NOT_FOUND);
    assert!(stderr(&output).contains("Hint:"));
}

#[test]
fn test_protected_paste_needs_passphrase() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);

    let id = id_from_url(&sandbox.put(b"guarded", &["--password", "swordfish"]));

    let output = sandbox.run(&["get", &id]);
    assert_exit(&output, EXIT_AUTH_FAILED);

    let output = sandbox.run(&["get", &id, "--password", "tuna"]);
    assert_exit(&output, EXIT_AUTH_FAILED);

    let output = sandbox
        .command()
        .args(["get", &id, "--raw"])
        .env("PASTEBURN_PASSWORD", "swordfish")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(output.stdout, b"guarded");
}

#[test]
fn test_invalid_id_is_rejected_before_lookup() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    let output = sandbox.run(&["get", "not-an-id!"]);
    assert_exit(&output, EXIT_INVALID_INPUT);
}

#[test]
fn test_invalid_submission_is_invalid_input() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);

    let output = sandbox.run_with_stdin(&["put"], b"");
    assert_exit(&output, EXIT_INVALID_INPUT);

    let output = sandbox.run_with_stdin(&["put", "--expire-hours", "-1"], b"content");
    assert_exit(&output, EXIT_INVALID_INPUT);

    let output = sandbox.run_with_stdin(&["put", "--ip", "not-an-ip"], b"content");
    assert_exit(&output, EXIT_INVALID_INPUT);
}

#[test]
fn test_captcha_hold_until_confirmed() {
    let sandbox = Sandbox::new();
    sandbox.init(&["--captcha"]);

    let redirect = sandbox.put(b"held", &[]);
    let encoded = redirect
        .strip_prefix("/showVerify?id=")
        .unwrap_or_else(|| panic!("unexpected output: {}", redirect));
    let id = String::from_utf8(URL_SAFE_NO_PAD.decode(encoded).unwrap()).unwrap();

    let output = sandbox.run(&["get", &id]);
    assert_exit(&output, EXIT_NOT_FOUND);

    let output = sandbox.run(&["confirm", &redirect]);
    assert_success(&output);
    assert!(stdout(&output).contains(&format!("https://paste.example.org/{}", id)));

    let output = sandbox.run(&["get", &id, "--raw"]);
    assert_success(&output);
    assert_eq!(output.stdout, b"held");

    // A second confirm has nothing left to lift
    let output = sandbox.run(&["confirm", &id]);
    assert_exit(&output, EXIT_NOT_FOUND);
}

#[test]
fn test_admin_key_and_delete() {
    let sandbox = Sandbox::new();
    sandbox.init(&["--master-key", "correct horse battery staple"]);

    let id = id_from_url(&sandbox.put(b"to be removed", &[]));

    let output = sandbox.run(&["admin-key"]);
    assert_success(&output);
    let hash = stdout(&output).trim().to_string();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    let output = sandbox.run(&["delete", &id, "--key-hash", &"0".repeat(64)]);
    assert_exit(&output, EXIT_AUTH_FAILED);

    let output = sandbox.run(&["delete", &id, "--key-hash", &hash]);
    assert_success(&output);
    assert!(stdout(&output).contains("Deleted paste"));

    let output = sandbox.run(&["get", &id]);
    assert_exit(&output, EXIT_NOT_FOUND);

    // Deleting again still succeeds
    let output = sandbox
        .command()
        .args(["delete", &id])
        .env("PASTEBURN_KEY_HASH", &hash)
        .output()
        .unwrap();
    assert_success(&output);
    assert!(stdout(&output).contains("already gone"));
}

#[test]
fn test_admin_key_without_master_key() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);

    let output = sandbox.run(&["admin-key"]);
    assert_exit(&output, EXIT_INVALID_INPUT);

    let id = id_from_url(&sandbox.put(b"stays", &[]));
    let output = sandbox.run(&["delete", &id, "--key-hash", &"a".repeat(64)]);
    assert_exit(&output, EXIT_AUTH_FAILED);
}

#[test]
fn test_purge_and_check() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    sandbox.put(b"live", &[]);

    let output = sandbox.run(&["purge"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Purged 0 expired paste(s)"));

    let output = sandbox.run(&["check"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Integrity check: OK"));
}

#[test]
fn test_check_reports_tampering() {
    let sandbox = Sandbox::new();
    sandbox.init(&[]);
    sandbox.put(b"open paste", &[]);

    let conn = Connection::open(sandbox.store_path()).unwrap();
    conn.busy_timeout(std::time::Duration::from_secs(5)).unwrap();
    conn.execute("UPDATE pastes SET passwd = 'forged'", []).unwrap();
    drop(conn);

    let output = sandbox.run(&["check"]);
    assert_exit(&output, EXIT_INTEGRITY_FAILED);
    assert!(stderr(&output).contains("Integrity check: FAILED"));
}

#[test]
fn test_quiet_init_prints_nothing() {
    let sandbox = Sandbox::new();
    let store = sandbox.store_path();
    let output = sandbox.run(&["-q", "init", "--store", store.to_str().unwrap()]);
    assert_success(&output);
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_completions_need_no_config() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("pasteburn"));
}

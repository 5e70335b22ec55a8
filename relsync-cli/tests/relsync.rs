use anyhow::{anyhow, Result};
use mockito::{Server, ServerGuard};
use serde_json::{json, Value};
use std::{fs, path::Path, process};
use tempfile::TempDir;

const RELSYNC: &str = env!("CARGO_BIN_EXE_relsync");

fn manifest(server: &ServerGuard, id: u64) -> Value {
    json!([{
        "id": id,
        "name": "Logic 2.4.0",
        "currentRelease": {
            "name": "Logic 2.4.0",
            "readmeUrl": format!("{}/readme", server.url()),
            "downloadUrl": format!("{}/file.zip", server.url()),
        }
    }])
}

#[test]
fn syncs_then_skips_up_to_date_release() -> Result<()> {
    let mut server = Server::new();
    let body = manifest(&server, 1).to_string();
    let list = server
        .mock("GET", "/list")
        .with_status(200)
        .with_body(body)
        .expect(2)
        .create();
    let readme = server
        .mock("GET", "/readme")
        .with_status(200)
        .with_body("readme body")
        .expect(1)
        .create();
    let zip = server
        .mock("GET", "/file.zip")
        .with_status(200)
        .with_body("file body")
        .expect(1)
        .create();

    let td = TempDir::new()?;
    let dir = td.path().join("downloads");
    let url = format!("{}/list", server.url());
    let dir_arg = dir.to_string_lossy().to_string();
    let args = ["--manifest-url", url.as_str(), "--dir", dir_arg.as_str()];

    let (stdout, _) = run_relsync(td.path(), &args)?;
    assert!(stdout.contains("[1/1] Processing release Logic 2.4.0..."), "{stdout}");
    assert!(stdout.contains("All releases processed."), "{stdout}");
    assert!(stdout.contains("All done!"), "{stdout}");

    let folder = dir.join("Logic 2.4.0");
    let metadata: Value =
        serde_json::from_str(&fs::read_to_string(folder.join("metadata.json"))?)?;
    assert_eq!(metadata["id"], json!(1));
    assert_eq!(fs::read_to_string(folder.join("README.md"))?, "readme body");
    assert_eq!(fs::read_to_string(folder.join("release.zip"))?, "file body");

    let (stdout, _) = run_relsync(td.path(), &args)?;
    assert!(
        stdout.contains("Release Logic 2.4.0 already downloaded and up to date."),
        "{stdout}",
    );

    list.assert();
    readme.assert();
    zip.assert();

    Ok(())
}

#[test]
fn downloads_dir_defaults_to_working_directory() -> Result<()> {
    let mut server = Server::new();
    let body = manifest(&server, 5).to_string();
    let _list = server
        .mock("GET", "/list")
        .with_status(200)
        .with_body(body)
        .create();
    let _readme = server
        .mock("GET", "/readme")
        .with_status(200)
        .with_body("r")
        .create();
    let _zip = server
        .mock("GET", "/file.zip")
        .with_status(200)
        .with_body("z")
        .create();

    let td = TempDir::new()?;
    let url = format!("{}/list", server.url());
    run_relsync(td.path(), &["--quiet", "--manifest-url", &url])?;

    assert!(td
        .path()
        .join("downloads")
        .join("Logic 2.4.0")
        .join("release.zip")
        .is_file());

    Ok(())
}

#[test]
fn quiet_prints_nothing() -> Result<()> {
    let mut server = Server::new();
    let _list = server
        .mock("GET", "/list")
        .with_status(200)
        .with_body("[]")
        .create();

    let td = TempDir::new()?;
    let url = format!("{}/list", server.url());
    let (stdout, stderr) = run_relsync(td.path(), &["-q", "-u", &url])?;
    assert_eq!(stdout, "");
    assert_eq!(stderr, "");

    Ok(())
}

#[test]
fn failed_manifest_request_exits_non_zero() -> Result<()> {
    let mut server = Server::new();
    let list = server.mock("GET", "/list").with_status(500).create();

    let td = TempDir::new()?;
    let url = format!("{}/list", server.url());
    let output = relsync_command(td.path(), &["--manifest-url", &url]).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("500"));
    assert!(!td.path().join("downloads").exists());

    list.assert();

    Ok(())
}

#[test]
fn invalid_manifest_url_exits_127() -> Result<()> {
    let td = TempDir::new()?;
    let output =
        relsync_command(td.path(), &["--manifest-url", "ftp://example.com/list"]).output()?;
    assert_eq!(output.status.code(), Some(127));

    let output = relsync_command(td.path(), &["--manifest-url", "not a url"]).output()?;
    assert_eq!(output.status.code(), Some(127));

    Ok(())
}

fn relsync_command(cwd: &Path, args: &[&str]) -> process::Command {
    let mut c = process::Command::new(RELSYNC);
    c.args(args).current_dir(cwd);
    c
}

fn run_relsync(cwd: &Path, args: &[&str]) -> Result<(String, String)> {
    let output = relsync_command(cwd, args).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    match output.status.code() {
        Some(0) => Ok((stdout, stderr)),
        code => Err(anyhow!(
            "ran relsync {} and got exit code {code:?}\nStdout:\n{stdout}\nStderr:\n{stderr}",
            args.join(" "),
        )),
    }
}

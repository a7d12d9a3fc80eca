use assert_cmd::prelude::*;
use color_eyre::Result;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn bookworm_rootfs(root: &Path) {
    let boot = root.join("debian/bookworm/boot");
    fs::create_dir_all(&boot).unwrap();
    fs::write(boot.join("vmlinuz-6.1.0-9"), b"kernel 6.1.0-9").unwrap();
    fs::write(boot.join("initrd.img-6.1.0-9"), b"initrd 6.1.0-9").unwrap();
}

fn autopxe(root: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("autopxe")?;
    cmd.env_remove("AUTOPXE_CONFIG")
        .env_remove("DEFAULT_DISTRO_VER")
        .env_remove("RUST_LOG")
        .arg("--rootfs")
        .arg(root);
    Ok(cmd)
}

#[test]
fn test_scan_json() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());

    let output = autopxe(tmp.path())?.args(["scan", "--json"]).output()?;
    assert!(
        output.status.success(),
        "scan failed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(catalog[0]["name"], "debian");
    assert_eq!(catalog[0]["releases"][0]["name"], "bookworm");

    let boot_files = catalog[0]["releases"][0]["boot_files"].as_array().unwrap();
    assert_eq!(boot_files.len(), 2);
    assert_eq!(boot_files[0]["version"]["raw"], "latest");
    assert_eq!(
        boot_files[1]["kernel_path"],
        "debian/bookworm/boot/vmlinuz-6.1.0-9"
    );
    Ok(())
}

#[test]
fn test_render_menu() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());

    let output = autopxe(tmp.path())?
        .args(["render", "autopxe-AA-BB-CC-DD-EE-FF", "--ip", "172.25.2.100"])
        .output()?;
    assert!(output.status.success());

    let script = String::from_utf8(output.stdout)?;
    assert!(script.starts_with("#!ipxe\n"));
    assert!(script.contains("AutoPXE Boot Main Menu aa:bb:cc:dd:ee:ff 172.25.2.100"));
    assert!(script.contains(":debian/bookworm/latest/nfsrw\n"));
    Ok(())
}

#[test]
fn test_render_default_image_from_env() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());

    let output = autopxe(tmp.path())?
        .env("DEFAULT_DISTRO_VER", "debian/bookworm/latest/ovl")
        .args(["render", "autopxe-aa:bb:cc:dd:ee:ff"])
        .output()?;
    assert!(output.status.success());

    let script = String::from_utf8(output.stdout)?;
    assert!(script.contains("set menu-default debian/bookworm/latest/ovl\n"));
    Ok(())
}

#[test]
fn test_render_file() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());

    let output = autopxe(tmp.path())?
        .args(["render", "boot/debian/bookworm/boot/initrd.img-6.1.0-9"])
        .output()?;
    assert!(output.status.success());
    assert_eq!(output.stdout, b"initrd 6.1.0-9");
    Ok(())
}

#[test]
fn test_render_unhandled_exits_2() -> Result<()> {
    let tmp = tempdir()?;

    let output = autopxe(tmp.path())?
        .args(["render", "pxelinux.0"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());
    let config = tmp.path().join("autopxe.yaml");
    fs::write(
        &config,
        "env:\n  nfs-server: 172.25.2.10\ncmdline_templates:\n  ram: ip=dhcp\n",
    )?;

    let output = autopxe(tmp.path())?
        .arg("--config")
        .arg(&config)
        .args(["render", "autopxe-aa:bb:cc:dd:ee:ff"])
        .output()?;
    assert!(output.status.success());

    let script = String::from_utf8(output.stdout)?;
    assert!(script.contains("set nfs-server 172.25.2.10\n"));
    assert!(script.contains(":debian/bookworm/latest/ram\n"));
    assert!(!script.contains("nfsrw"));
    Ok(())
}

#[test]
fn test_check() -> Result<()> {
    let tmp = tempdir()?;
    bookworm_rootfs(tmp.path());

    let output = autopxe(tmp.path())?.arg("check").output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "ok: 1 distros, 6 menu entries\n"
    );

    let output = autopxe(&tmp.path().join("missing"))?.arg("check").output()?;
    assert!(!output.status.success());
    Ok(())
}

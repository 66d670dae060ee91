use assert_cmd::prelude::*;
use indoc::indoc;
use std::fs;
use std::path::Path;
use std::process::Command;

const GENERATOR: &str = "1FF9E9AAC5FE0408024591DC5D52768A";
// scrambles with KEY_Y to the NIST SP 800-38A CTR-AES128 key
const KEY_X: &str = "0F6E90679B1E1A9F05305330548296CE";
const KEY_Y: &str = "00112233445566778899AABBCCDDEEFF";
const COUNTER: &str = "F0F1F2F3F4F5F6F7F8F9FAFBFCFDFEFF";
const PLAINTEXT: &str = "6BC1BEE22E409F96E93D7E117393172A\
                         AE2D8A571E03AC9C9EB76FAC45AF8E51\
                         30C81C46A35CE411E5FBC1191A0A52EF\
                         F69F2445DF4F9B17AD2B417BE66C3710";
const CIPHERTEXT: &str = "874D6191B620E3261BEF6864990DB6CE\
                          9806F66B7970FDFF8617187BB9FFFDFF\
                          5AE4DF3EDBD5D35E5B4F09020DB03EAB\
                          1E031DDA2FBE03D1792170A0F3009CEE";
const OUTPUT_NAME: &str = "/0004000000055d00.Main.exheader.xorpad";

fn write_descriptor(dir: &Path) -> std::path::PathBuf {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0xFFFFFFFFu32.to_le_bytes());
    buf.extend_from_slice(&0xF0000004u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());

    buf.extend_from_slice(&hex::decode(COUNTER).unwrap());
    buf.extend_from_slice(&hex::decode(KEY_Y).unwrap());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&hex::decode("0004000000055D00").unwrap());
    let mut name = [0u8; 112];
    name[..OUTPUT_NAME.len()].copy_from_slice(OUTPUT_NAME.as_bytes());
    buf.extend_from_slice(&name);

    let path = dir.join("ncchinfo.bin");
    fs::write(&path, buf).unwrap();
    path
}

fn write_keys(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("keys.txt");
    fs::write(
        &path,
        format!("; test key material\ngenerator = {GENERATOR}\nslot0x2CKeyX = {KEY_X}\n"),
    )
    .unwrap();
    path
}

#[test]
fn test_cli_info() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let assert = Command::cargo_bin("ctrcrypt")
        .unwrap()
        .arg("info")
        .arg(descriptor)
        .assert();
    assert.success().stdout(indoc! {"
        version: 4
        1 descriptor entries
    "});
}

#[test]
fn test_cli_list() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let assert = Command::cargo_bin("ctrcrypt")
        .unwrap()
        .arg("list")
        .arg(descriptor)
        .assert();
    assert.success().stdout(indoc! {"
        0004000000055d00 slot 0x2C      1 MB /0004000000055d00.Main.exheader.xorpad
    "});
}

#[test]
fn test_cli_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());
    let keys = write_keys(dir.path());

    let payload = dir.path().join("payload.bin");
    fs::write(&payload, hex::decode(CIPHERTEXT).unwrap()).unwrap();
    let out = dir.path().join("out");

    let assert = Command::cargo_bin("ctrcrypt")
        .unwrap()
        .arg("decrypt")
        .arg("--keys")
        .arg(&keys)
        .arg("--output")
        .arg(&out)
        .arg(&descriptor)
        .arg(&payload)
        .assert();
    assert.success();

    let decrypted = fs::read(out.join("0004000000055d00.Main.exheader.xorpad")).unwrap();
    assert_eq!(decrypted, hex::decode(PLAINTEXT).unwrap());
}

#[test]
fn test_cli_decrypt_without_generator() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let keys = dir.path().join("keys.txt");
    fs::write(&keys, format!("slot0x2CKeyX = {KEY_X}\n")).unwrap();
    let payload = dir.path().join("payload.bin");
    fs::write(&payload, hex::decode(CIPHERTEXT).unwrap()).unwrap();

    let assert = Command::cargo_bin("ctrcrypt")
        .unwrap()
        .arg("decrypt")
        .arg("--keys")
        .arg(&keys)
        .arg(&descriptor)
        .arg(&payload)
        .assert();
    assert.failure().stderr(indoc! {"
        Error: key file has no generator constant
    "});
}

#[test]
fn test_cli_pad() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());
    let keys = write_keys(dir.path());
    let out = dir.path().join("pads");

    let assert = Command::cargo_bin("ctrcrypt")
        .unwrap()
        .arg("pad")
        .arg("--keys")
        .arg(&keys)
        .arg("--output")
        .arg(&out)
        .arg(&descriptor)
        .assert();
    assert.success();

    let pad = fs::read(out.join("0004000000055d00.Main.exheader.xorpad")).unwrap();
    assert_eq!(pad.len(), 1 << 20);
    // pad over zeros == keystream == ciphertext XOR plaintext
    let ct = hex::decode(CIPHERTEXT).unwrap();
    let pt = hex::decode(PLAINTEXT).unwrap();
    for i in 0..ct.len() {
        assert_eq!(pad[i], ct[i] ^ pt[i]);
    }
}

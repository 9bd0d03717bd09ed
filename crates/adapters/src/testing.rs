// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake cracking binaries for tests.
//!
//! Each script appends its arguments to `{script}.calls` and exits early when
//! `HF_FAKE_PROBE` is set, which lets the writer confirm the file is
//! executable before handing it out.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const PROBE_ENV: &str = "HF_FAKE_PROBE";
/// `ETXTBSY`: the file is still open for writing somewhere.
const TEXT_FILE_BUSY: i32 = 26;

/// Write an executable shell script named `name` in `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\n[ -n \"${PROBE_ENV}\" ] && exit 0\necho \"$@\" >> \"$0.calls\"\n{body}\n"
    );
    std::fs::write(&path, script)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;

    for _ in 0..100 {
        match std::process::Command::new(&path).env(PROBE_ENV, "1").status() {
            Ok(_) => return Ok(path),
            Err(e) if e.raw_os_error() == Some(TEXT_FILE_BUSY) => {
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::other("fake binary stayed busy"))
}

/// A dictionary attack against raw MD5 hashes: every wordlist entry whose
/// digest appears in the hashes file is appended to the output file.
pub fn md5_cracker(dir: &Path) -> io::Result<PathBuf> {
    write_script(
        dir,
        "fake-hashcat",
        r#"out="$6"; hashes="${11}"; wordlist="${12}"
while IFS= read -r word || [ -n "$word" ]; do
  h=$(printf '%s' "$word" | md5sum | cut -d' ' -f1)
  if grep -qx "$h" "$hashes"; then echo "$h:$word" >> "$out"; fi
done < "$wordlist"
exit 0"#,
    )
}

/// Exits with `code` without producing output.
pub fn exiting(dir: &Path, code: i32) -> io::Result<PathBuf> {
    write_script(dir, &format!("fake-hashcat-exit-{code}"), &format!("exit {code}"))
}

/// Runs until killed.
pub fn sleeping(dir: &Path) -> io::Result<PathBuf> {
    write_script(dir, "fake-hashcat-sleep", "exec sleep 300")
}

/// Argument lines recorded by a script written with [`write_script`].
pub fn calls(script: &Path) -> Vec<String> {
    let mut calls = script.as_os_str().to_owned();
    calls.push(".calls");
    std::fs::read_to_string(PathBuf::from(calls))
        .map(|s| s.lines().map(String::from).collect())
        .unwrap_or_default()
}

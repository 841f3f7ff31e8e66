//! Renders the it8951 man pages: `it8951.1` plus one page per subcommand
//! (`it8951-flash.1`, `it8951-fw.1`, ...).
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[path = "../devices.rs"]
#[allow(dead_code)]
mod devices;

#[path = "../cli.rs"]
mod cli;

fn render(cmd: clap::Command, dir: &Path, name: &str) -> io::Result<PathBuf> {
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd).title(name).render(&mut page)?;
    let path = dir.join(format!("{}.1", name));
    fs::write(&path, page)?;
    Ok(path)
}

fn main() -> io::Result<()> {
    let dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&dir)?;

    let cmd = cli::Cli::command();
    let main_page = render(cmd.clone(), &dir, "it8951")?;
    println!("{}", main_page.display());

    for sub in cmd.get_subcommands() {
        let name = format!("it8951-{}", sub.get_name());
        let page = render(sub.clone(), &dir, &name)?;
        println!("{}", page.display());
    }

    println!("\nView with: man -l {}", main_page.display());
    Ok(())
}

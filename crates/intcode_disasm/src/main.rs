use anyhow::{Context, Result};
use intcode::{decode, Memory, Step};
use std::fs;

/// Linear sweep: decode at every instruction boundary, fall back to a
/// single data word whenever a word does not decode.
fn listing(memory: &Memory) -> Vec<String> {
    let mut lines = Vec::new();
    let mut addr = 0;
    while addr < memory.len() {
        let word = memory.cells()[addr];
        match decode(memory, addr) {
            Ok(Step::Next(ins)) => {
                lines.push(format!("{:04}: {}", addr, ins));
                addr += ins.size();
            }
            Ok(Step::Halt) => {
                lines.push(format!("{:04}: halt", addr));
                addr += 1;
            }
            Err(_) => {
                lines.push(format!("{:04}: .data {}", addr, word));
                addr += 1;
            }
        }
    }
    lines
}

fn main() -> Result<()> {
    let path = std::env::args().nth(1).context("usage: intcode_disasm <program.txt>")?;
    let source = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
    let memory = Memory::parse(&source).with_context(|| format!("parse {path}"))?;
    for line in listing(&memory) {
        println!("{line}");
    }
    Ok(())
}

use anyhow::{bail, Context, Result};
use colored::Colorize;
use intcode::{
    diagnostic_line, run_restored, DiagnosticWriter, NounVerb, Program, RunReport, Vm, VmConfig,
    VmError,
};
use std::fs;
use std::io::Write;

pub fn load(path: &str) -> Result<Program> {
    let source = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let program = Program::load(&source)
        .map_err(VmError::from)
        .with_context(|| format!("parse {path}"))?;
    Ok(program)
}

// ── run ─────────────────────────────────────────────────────────

pub fn run(
    cfg: &VmConfig,
    program: Program,
    input: Option<i64>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    if json {
        let mut vm = Vm::new(*cfg, program, Vec::new());
        vm.set_input(input);
        let outcome = vm.run()?;
        let (program, outputs) = vm.into_parts();
        writeln!(out, "{}", RunReport::new(&outcome, &program, outputs).to_json_pretty()?)?;
        return Ok(());
    }

    let mut vm = Vm::new(*cfg, program, DiagnosticWriter::new(&mut *out));
    vm.set_input(input);
    let outcome = vm.run()?;
    writeln!(out, "{} {}", "Result:".dimmed(), outcome.result.to_string().cyan())?;
    writeln!(out, "{} {}", "Steps: ".dimmed(), outcome.steps.to_string().dimmed())?;
    Ok(())
}

// ── restore (day 2, part 1) ─────────────────────────────────────

pub fn restore(
    cfg: &VmConfig,
    program: &Program,
    noun: i64,
    verb: i64,
    out: &mut impl Write,
) -> Result<()> {
    let result = run_restored(program, noun, verb, cfg)?;
    writeln!(out, "{} {}", "Result:".dimmed(), result.to_string().cyan())?;
    Ok(())
}

// ── search (day 2, part 2) ──────────────────────────────────────

#[cfg(feature = "parallel")]
fn find(program: &Program, target: i64, cfg: &VmConfig) -> Option<NounVerb> {
    intcode::par_search(program, target, cfg)
}

#[cfg(not(feature = "parallel"))]
fn find(program: &Program, target: i64, cfg: &VmConfig) -> Option<NounVerb> {
    intcode::search(program, target, cfg)
}

pub fn search(cfg: &VmConfig, program: &Program, target: i64, out: &mut impl Write) -> Result<()> {
    let Some(hit) = find(program, target, cfg) else {
        bail!("no noun/verb in 0..100 produces {target}");
    };
    writeln!(out, "{} {}", "Noun:  ".dimmed(), hit.noun)?;
    writeln!(out, "{} {}", "Verb:  ".dimmed(), hit.verb)?;
    writeln!(out, "{} {}", "Answer:".dimmed(), hit.answer().to_string().green().bold())?;
    Ok(())
}

// ── diagnose (day 5) ────────────────────────────────────────────

pub fn diagnose(
    cfg: &VmConfig,
    program: &Program,
    ids: &[i64],
    out: &mut impl Write,
) -> Result<()> {
    for &id in ids {
        writeln!(out, "{} {}", "System ID:".bold(), id)?;
        let mut vm = Vm::new(*cfg, program.clone(), DiagnosticWriter::new(&mut *out)).with_input(id);
        vm.run().with_context(|| format!("diagnostic run for id {id}"))?;
    }
    Ok(())
}

// ── trace ───────────────────────────────────────────────────────

pub fn trace(
    cfg: &VmConfig,
    program: Program,
    input: Option<i64>,
    out: &mut impl Write,
) -> Result<()> {
    let mut vm = Vm::new(*cfg, program, Vec::new());
    vm.set_input(input);

    let mut trace = vm.trace();
    let mut n = 0;
    let mut printed = 0;
    while let Some(item) = trace.next() {
        let ins = item?;
        writeln!(out, "{} {}", format!("{:>6}", n).dimmed(), ins.to_string().blue())?;
        for &value in &trace.output()[printed..] {
            writeln!(out, "{}", diagnostic_line(value))?;
        }
        printed = trace.output().len();
        n += 1;
    }
    writeln!(out, "{} {}", "Result:".dimmed(), vm.program().result().to_string().cyan())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captured(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn program(src: &str) -> Program {
        Program::load(src).unwrap()
    }

    // ── run ──────────────────────────────────────────────────────

    #[test]
    fn run_json_is_a_well_formed_report() {
        let cfg = VmConfig::default();
        let text = captured(|out| run(&cfg, program("3,0,4,0,99"), Some(7), true, out));
        let report: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(report["result"], 7);
        assert_eq!(report["steps"], 2);
        assert_eq!(report["instruction_pointer"], 4);
        assert_eq!(report["outputs"], serde_json::json!([7]));
        assert!(report["memory_cid"].as_str().unwrap().starts_with("b3:"));
    }

    #[test]
    fn run_prints_diagnostics_before_result() {
        let cfg = VmConfig::default();
        let text = captured(|out| run(&cfg, program("3,0,4,0,99"), Some(-2), false, out));
        assert!(text.starts_with("Diagnostic code:  -2\n"), "got: {text}");
    }

    #[test]
    fn run_surfaces_vm_errors() {
        let cfg = VmConfig::default();
        let err = run(&cfg, program("3,0,99"), None, true, &mut Vec::<u8>::new()).unwrap_err();
        assert!(err.downcast_ref::<VmError>().is_some());
    }

    // ── restore / search ─────────────────────────────────────────

    #[test]
    fn restore_prints_address_zero() {
        let cfg = VmConfig::default();
        let p = program("1,0,0,0,99,0,0,0,0,30,40,50");
        let text = captured(|out| restore(&cfg, &p, 9, 11, out));
        assert!(text.contains("80"), "got: {text}");
    }

    #[test]
    fn search_prints_the_answer() {
        let cfg = VmConfig::default();
        let p = program("1101,0,0,13,1002,1,100,14,1,14,2,0,99,0,0");
        let text = captured(|out| search(&cfg, &p, 4207, out));
        assert!(text.contains("42"));
        assert!(text.contains("4207"), "got: {text}");
    }

    #[test]
    fn search_without_solution_fails() {
        let cfg = VmConfig::default();
        let p = program("1101,0,0,13,1002,1,100,14,1,14,2,0,99,0,0");
        let err = search(&cfg, &p, 10_000, &mut Vec::<u8>::new()).unwrap_err();
        assert!(err.to_string().contains("10000"), "got: {err}");
    }

    // ── diagnose / trace ─────────────────────────────────────────

    #[test]
    fn diagnose_runs_each_id_on_a_fresh_copy() {
        let cfg = VmConfig::default();
        let p = program("3,9,8,9,10,9,4,9,99,-1,8");
        let text = captured(|out| diagnose(&cfg, &p, &[8, 1], out));
        let codes: Vec<_> = text.lines().filter(|l| l.starts_with("Diagnostic code:")).collect();
        assert_eq!(codes, vec!["Diagnostic code:  1", "Diagnostic code:  0"]);
    }

    #[test]
    fn trace_interleaves_instructions_and_outputs() {
        let cfg = VmConfig::default();
        let text = captured(|out| trace(&cfg, program("1002,8,3,8,104,77,99,0,33"), None, out));
        let mul = text.find("mul [8], 3 -> [8]").unwrap();
        let out = text.find("out 77").unwrap();
        let code = text.find("Diagnostic code:  77").unwrap();
        assert!(mul < out && out < code, "got: {text}");
    }
}

use super::code::{ConstKind, Module, Program};
use crate::isa::Instruction;
use log::debug;
use std::fmt::{self, Display};

fn write_block(f: &mut fmt::Formatter<'_>, code: &[Instruction]) -> fmt::Result {
    for (offset, inst) in code.iter().enumerate() {
        writeln!(f, "{}   {}", offset, inst)?;
    }
    Ok(())
}

impl Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".constants:")?;
        for (idx, c) in self.constants.iter().enumerate() {
            match c.kind {
                ConstKind::Str => writeln!(f, "{} S \"{}\"", idx, c.text)?,
                kind if c.text.is_empty() => writeln!(f, "{} {}", idx, kind.letter())?,
                kind => writeln!(f, "{} {} {}", idx, kind.letter(), c.text)?,
            }
        }

        writeln!(f, ".start:")?;
        write_block(f, &self.start)?;

        writeln!(f, ".functions:")?;
        for (order, func) in self.functions.iter().enumerate() {
            writeln!(
                f,
                "{} {} {} {}",
                order, func.name_index, func.param_count, func.level
            )?;
        }

        for (order, func) in self.functions.iter().enumerate() {
            writeln!(f, ".F{}:", order)?;
            write_block(f, &func.code)?;
        }

        Ok(())
    }
}

/// Renders the assembly listing of a program.
pub fn to_assembly(prog: &Program) -> String {
    let module = Module::lower(prog);
    debug!(
        "listing {} constants, {} functions",
        module.constants.len(),
        module.functions.len()
    );
    module.to_string()
}

use margin::AnnotationKind;
use std::io::{self, Write};

/// Print every annotation kind with its meaning, one per line.
pub fn write_kinds(out: &mut impl Write) -> io::Result<()> {
    for kind in AnnotationKind::ALL {
        writeln!(out, "{:<10} {}", kind.label(), kind.description())?;
    }
    Ok(())
}

pub fn run() -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write_kinds(&mut stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_all_kinds_in_order() {
        let mut out = Vec::new();
        write_kinds(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let labels: Vec<&str> = out
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(labels, ["NOTE", "SUGGESTION", "ISSUE", "PRAISE"]);
    }
}

//! Native code generation and linking via the system `llc` and `cc`.
//!
//! Infix has no runtime library of its own: the generated module's only
//! external dependency is libc's `printf`, declared the same way any other
//! `extern` would be. Turning textual IR into an executable is therefore
//! two subprocess hops -- `llc` lowers `.ll` to a native `.o`, then `cc`
//! drives the system linker -- with no runtime archive to locate first.

use std::path::Path;
use std::process::Command;

/// Compile textual LLVM IR to a native object file with `llc`.
///
/// # Errors
///
/// Returns an error string if `llc` cannot be found or returns non-zero.
pub fn assemble(ir_path: &Path, object_path: &Path) -> Result<(), String> {
    let output = Command::new("llc")
        .arg("-filetype=obj")
        .arg(ir_path)
        .arg("-o")
        .arg(object_path)
        .output()
        .map_err(|e| format!("Failed to invoke llc: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("llc failed:\n{stderr}"));
    }

    Ok(())
}

/// Link an object file into a native executable using the system C
/// compiler (`cc`) as the linker driver, which pulls in libc (and hence
/// `printf`) along with the platform's CRT objects automatically.
///
/// # Errors
///
/// Returns an error string if the linker cannot be found or linking fails.
pub fn link(object_path: &Path, output_path: &Path) -> Result<(), String> {
    let output = Command::new("cc")
        .arg(object_path)
        .arg("-o")
        .arg(output_path)
        .output()
        .map_err(|e| format!("Failed to invoke linker (cc): {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Linking failed:\n{stderr}"));
    }

    std::fs::remove_file(object_path).ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_reports_missing_input_rather_than_panicking() {
        let result = assemble(Path::new("/nonexistent/in.ll"), Path::new("/tmp/infix-test-out.o"));
        assert!(result.is_err());
    }
}

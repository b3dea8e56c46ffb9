use std::fmt::Write as _;

/// Accumulates one function (or the module preamble)'s worth of textual
/// LLVM IR, one instruction/line at a time, with its own register and
/// label counters so inlining another function's buffer never collides
/// names.
#[derive(Debug, Default)]
pub struct Llvm {
    last_reg: u32,
    last_lbl: u32,
    pub code: String,
}

impl Llvm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: &str) {
        self.code.push_str(line);
        self.code.push('\n');
    }

    pub fn comment(&mut self, comment: &str) {
        self.code.push_str("; ");
        self.code.push_str(comment);
        self.code.push('\n');
    }

    pub fn next_lbl(&mut self) -> String {
        self.last_lbl += 1;
        format!("lbl{}", self.last_lbl)
    }

    pub fn label(&mut self, name: &str) {
        let _ = writeln!(self.code, "{name}:");
    }

    pub fn ty(&mut self, name: &str, repr: &str) {
        let _ = writeln!(self.code, "{name} = type {repr}");
    }

    pub fn global_variable(&mut self, name: &str, vtype: &str, value: Option<&str>) {
        match value {
            None => {
                let _ = writeln!(self.code, "{name} = constant {vtype}");
            }
            Some(v) => {
                let _ = writeln!(self.code, "{name} = constant {vtype} {v}");
            }
        }
    }

    pub fn declare(&mut self, name: &str, rtype: &str, args: &[&str]) {
        let _ = writeln!(self.code, "declare {} {}({})", rtype, name, args.join(", "));
    }

    /// Emits `define ... {` and returns the closing brace to be written
    /// by the caller once the body has been appended to `self.code`.
    pub fn define_header(&mut self, internal: bool, rtype: &str, name: &str, args: &[(String, String)]) {
        let args = args
            .iter()
            .map(|(ty, nm)| format!("{ty} {nm}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            self.code,
            "define {} {} {}({})",
            if internal { "internal" } else { "external" },
            rtype,
            name,
            args
        );
        self.line("{");
    }

    pub fn define_footer(&mut self) {
        self.line("}");
    }

    fn instr(&mut self, body: &str) {
        let _ = writeln!(self.code, "    {body}");
    }

    fn next_reg(&mut self) -> String {
        self.last_reg += 1;
        format!("%reg{}", self.last_reg)
    }

    pub fn alloca(&mut self, ty: &str, reg: Option<&str>) -> String {
        let reg = reg.map(str::to_string).unwrap_or_else(|| self.next_reg());
        self.instr(&format!("{reg} = alloca {ty}"));
        reg
    }

    pub fn ptrtoint(&mut self, from_type: &str, to_type: &str, value: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = ptrtoint {from_type} {value} to {to_type}"));
        reg
    }

    pub fn bitcast(&mut self, from_type: &str, to_type: &str, value: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = bitcast {from_type} {value} to {to_type}"));
        reg
    }

    pub fn get_element_ptr(&mut self, rtype: &str, ptype: &str, pname: &str, indices: &[(&str, String)]) -> String {
        let reg = self.next_reg();
        let mut body = format!("{reg} = getelementptr {rtype}, {ptype} {pname}");
        for (ity, ival) in indices {
            let _ = write!(body, ", {ity} {ival}");
        }
        self.instr(&body);
        reg
    }

    pub fn load(&mut self, store_type: &str, value_type: &str, value: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = load {store_type}, {value_type} {value}"));
        reg
    }

    pub fn store(&mut self, rtype: &str, rname: &str, ptype: &str, pname: &str) {
        self.instr(&format!("store {rtype} {rname}, {ptype} {pname}"));
    }

    pub fn fpext(&mut self, from_type: &str, to_type: &str, value: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = fpext {from_type} {value} to {to_type}"));
        reg
    }

    pub fn sext(&mut self, from_type: &str, to_type: &str, value: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = sext {from_type} {value} to {to_type}"));
        reg
    }

    /// `args` is a flat list of alternating `(type, value)` pairs, as in
    /// the rest of this emitter's call-building helpers.
    pub fn call(&mut self, ftype: &str, fname: &str, args: &[(String, String)]) -> Option<String> {
        let argptrn = args.iter().map(|(t, v)| format!("{t} {v}")).collect::<Vec<_>>().join(", ");
        if ftype != "void" {
            let reg = self.next_reg();
            self.instr(&format!("{reg} = call {ftype} {fname}({argptrn})"));
            Some(reg)
        } else {
            self.instr(&format!("call {ftype} {fname}({argptrn})"));
            None
        }
    }

    pub fn ret(&mut self, ty: &str, reg: Option<&str>) {
        match reg {
            None => self.instr(&format!("ret {ty}")),
            Some(r) => self.instr(&format!("ret {ty} {r}")),
        }
    }

    pub fn br_if_else(&mut self, cdreg: &str, tlabel: &str, flabel: &str) {
        self.instr(&format!("br i1 {cdreg}, label %{tlabel}, label %{flabel}"));
    }

    pub fn br(&mut self, label: &str) {
        self.instr(&format!("br label %{label}"));
    }

    pub fn icmp(&mut self, op: &str, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = icmp {op} {rtype} {a}, {b}"));
        reg
    }

    pub fn add(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = add {rtype} {a}, {b}"));
        reg
    }

    pub fn fadd(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = fadd {rtype} {a}, {b}"));
        reg
    }

    pub fn sub(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = sub {rtype} {a}, {b}"));
        reg
    }

    pub fn fsub(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = fsub {rtype} {a}, {b}"));
        reg
    }

    pub fn mul(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = mul {rtype} {a}, {b}"));
        reg
    }

    pub fn fmul(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = fmul {rtype} {a}, {b}"));
        reg
    }

    pub fn sdiv(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = sdiv {rtype} {a}, {b}"));
        reg
    }

    pub fn fdiv(&mut self, rtype: &str, a: &str, b: &str) -> String {
        let reg = self.next_reg();
        self.instr(&format!("{reg} = fdiv {rtype} {a}, {b}"));
        reg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_labels_are_sequential() {
        let mut llvm = Llvm::new();
        assert_eq!(llvm.next_reg(), "%reg1");
        assert_eq!(llvm.next_reg(), "%reg2");
        assert_eq!(llvm.next_lbl(), "lbl1");
    }

    #[test]
    fn call_with_void_return_has_no_register() {
        let mut llvm = Llvm::new();
        let reg = llvm.call("void", "@foo", &[("%i32".into(), "%reg1".into())]);
        assert!(reg.is_none());
        assert!(llvm.code.contains("call void @foo(%i32 %reg1)"));
    }
}

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

use crate::error::{IrError, IrErrorKind};
use crate::types::Type;
use crate::variable::{External, Function, Variable};

/// The semantic model of one compilation unit: the type/variable/
/// function registries, the active emission target (`current`), and
/// constant interning. Every name-resolution and code-emission
/// operation the generator needs lives here.
pub struct Module {
    pub types: IndexMap<String, Type>,
    pub variables: IndexMap<String, Variable>,
    pub externals: IndexMap<String, External>,
    pub functions: IndexMap<String, Function>,
    current: String,
    current_stack: Vec<String>,
    last_const_reg: u32,
    const_regs: HashMap<String, String>,
    pending_seq: u32,
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl Module {
    pub fn new() -> Self {
        let mut module = Self {
            types: IndexMap::new(),
            variables: IndexMap::new(),
            externals: IndexMap::new(),
            functions: IndexMap::new(),
            current: "@main".to_string(),
            current_stack: Vec::new(),
            last_const_reg: 0,
            const_regs: HashMap::new(),
            pending_seq: 0,
        };
        module.seed_types();

        let i32_ty = module.ty("%i32", 0, 0).expect("%i32 seeded");
        let mut main = Function::new("@main", i32_ty.clone());
        main.used = true;
        main.args.insert("%argc".into(), Variable::new("%argc", i32_ty));
        let cstr_ptr_ty = module.ty("%cstr.ptr", 0, 0).expect("%cstr.ptr seeded");
        main.args.insert("%argv".into(), Variable::new("%argv", cstr_ptr_ty));
        module.functions.insert("@main".into(), main);

        crate::builtins::register(&mut module);
        module
    }

    fn seed_types(&mut self) {
        let defs: &[(&str, &str, bool)] = &[
            ("%void", "void", true),
            ("%ptr", "i8*", false),
            ("%bool", "i1", true),
            ("%i8", "i8", true),
            ("%i16", "i16", true),
            ("%i32", "i32", true),
            ("%i64", "i64", true),
            ("%f16", "half", true),
            ("%f32", "float", true),
            ("%f64", "double", true),
            ("%f128", "fp128", true),
            ("%vararg", "...", true),
            ("%cstr", "i8*", false),
            ("%cstr.ptr", "i8**", false),
        ];
        for (name, repr, primitive) in defs {
            self.new_type(name, repr, *primitive, 0, 0).expect("seed type is unique");
        }
    }

    // -- type registry --------------------------------------------------

    pub fn new_type(&mut self, name: &str, repr: &str, primitive: bool, row: u32, col: u32) -> Result<Type, IrError> {
        if self.types.contains_key(name) {
            return Err(IrError::new(IrErrorKind::DuplicatedType(name.to_string()), row, col));
        }
        let ty = Type::new(name, repr, primitive);
        self.types.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    pub fn ty(&self, name: &str, row: u32, col: u32) -> Result<Type, IrError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| IrError::new(IrErrorKind::UndeclaredType(name.to_string()), row, col))
    }

    /// `type(name, repr)` in the source idiom: return the existing type
    /// or declare it on the fly. Used for the on-demand sized `%cstr.N`
    /// and `%list.T` types, which are never duplicated by construction.
    fn ty_or_declare(&mut self, name: &str, repr: &str) -> Type {
        if let Some(t) = self.types.get(name) {
            return t.clone();
        }
        let ty = Type::new(name, repr, false);
        self.types.insert(name.to_string(), ty.clone());
        ty
    }

    // -- current function -------------------------------------------------

    fn current_fn(&self) -> &Function {
        self.functions.get(&self.current).expect("current always names a live function")
    }

    fn current_fn_mut(&mut self) -> &mut Function {
        self.functions.get_mut(&self.current).expect("current always names a live function")
    }

    // -- variables and scopes --------------------------------------------

    pub fn new_variable(&mut self, name: &str, ty: Type, row: u32, col: u32) -> Result<Variable, IrError> {
        {
            let f = self.current_fn();
            if f.args.contains_key(name) || f.variables.contains_key(name) {
                return Err(IrError::new(IrErrorKind::DuplicatedVariable(name.to_string()), row, col));
            }
        }
        if name == "%left" || name == "%right" {
            let v = Variable::new(name, ty);
            self.current_fn_mut().args.insert(name.to_string(), v.clone());
            return Ok(v);
        }
        let f = self.current_fn_mut();
        let reg = f.llvm.alloca(ty.to_llvm_ir(), Some(name));
        let v = Variable::new(reg, ty);
        f.variables.insert(name.to_string(), v.clone());
        Ok(v)
    }

    pub fn ptr_to(&self, name: &str, row: u32, col: u32) -> Result<Variable, IrError> {
        let slot = self
            .current_fn()
            .variables
            .get(name)
            .ok_or_else(|| IrError::new(IrErrorKind::UnknownSymbol(name.to_string()), row, col))?;
        Ok(Variable::new(slot.name.clone(), slot.ty.ptr()))
    }

    pub fn variable(&mut self, name: &str, row: u32, col: u32) -> Result<Variable, IrError> {
        if let Some(slot) = self.current_fn().variables.get(name).cloned() {
            let ir = slot.ty.to_llvm_ir().to_string();
            let f = self.current_fn_mut();
            let reg = f.llvm.load(&ir, &format!("{ir}*"), &slot.name);
            return Ok(Variable::new(reg, slot.ty));
        }
        if let Some(arg) = self.current_fn().args.get(name).cloned() {
            return Ok(arg);
        }
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| IrError::new(IrErrorKind::UnknownSymbol(name.to_string()), row, col))
    }

    pub fn assign(&mut self, name: &str, value: &Variable) -> Variable {
        let ir = value.ty.to_llvm_ir().to_string();
        self.current_fn_mut().llvm.store(&ir, &value.name, &format!("{ir}*"), name);
        value.clone()
    }

    // -- constant interning -----------------------------------------------

    fn new_global_var(&mut self, name: String, ty: Type, value: String) -> Variable {
        let v = Variable::with_value(name.clone(), ty, value);
        self.variables.insert(name, v.clone());
        v
    }

    fn const_(&mut self, ty: Type, value: String) -> Variable {
        let index = format!("{};{}", ty.name, value);
        if let Some(name) = self.const_regs.get(&index).cloned() {
            return self.variables.get(&name).cloned().expect("interned const is global");
        }
        self.last_const_reg += 1;
        let name = format!("@const.{}", self.last_const_reg);
        self.const_regs.insert(index, name.clone());
        self.new_global_var(name, ty, value)
    }

    fn load_const(&mut self, ptr: &Variable) -> Variable {
        let ir = ptr.ty.to_llvm_ir().to_string();
        let reg = self.current_fn_mut().llvm.load(&ir, &format!("{ir}*"), &ptr.name);
        Variable::new(reg, ptr.ty.clone())
    }

    pub fn const_bool(&mut self, value: bool) -> Variable {
        let ty = self.ty("%bool", 0, 0).expect("%bool seeded");
        let ptr = self.const_(ty, if value { "1".into() } else { "0".into() });
        self.load_const(&ptr)
    }

    pub fn const_i32(&mut self, value: i64) -> Variable {
        let ty = self.ty("%i32", 0, 0).expect("%i32 seeded");
        let ptr = self.const_(ty, value.to_string());
        self.load_const(&ptr)
    }

    pub fn const_i8(&mut self, value: u8) -> Variable {
        let ty = self.ty("%i8", 0, 0).expect("%i8 seeded");
        let ptr = self.const_(ty, value.to_string());
        self.load_const(&ptr)
    }

    /// Parses `value` as an IEEE-754 double, then masks off the low 29
    /// bits -- LLVM's required spelling of a single-precision immediate
    /// as the double-precision representation of that value.
    pub fn const_f32(&mut self, value: f64) -> Variable {
        let bits = value.to_bits() & 0xFFFF_FFFF_E000_0000u64;
        let ty = self.ty("%f32", 0, 0).expect("%f32 seeded");
        let ptr = self.const_(ty, format!("0x{bits:X}"));
        self.load_const(&ptr)
    }

    pub fn const_f64(&mut self, value: f64) -> Variable {
        let ty = self.ty("%f64", 0, 0).expect("%f64 seeded");
        let ptr = self.const_(ty, format!("{value:?}"));
        self.load_const(&ptr)
    }

    /// `null` is an LLVM immediate, not an interned global -- no load is
    /// needed to produce a usable operand.
    pub fn const_ptr_null(&mut self) -> Variable {
        let ty = self.ty("%ptr", 0, 0).expect("%ptr seeded");
        Variable::new("null", ty)
    }

    pub fn const_cstr(&mut self, value: &str) -> Variable {
        let size = value.len() + 1;
        let escaped = value.replace('\n', "\\0A");
        let tname = format!("%cstr.{size}");
        let stype = self.ty_or_declare(&tname, &format!("[ {size} x i8 ]"));
        let ptr = self.const_(stype.clone(), format!("c\"{escaped}\\00\""));
        let ir = stype.to_llvm_ir().to_string();
        let reg = self.current_fn_mut().llvm.get_element_ptr(
            &ir,
            &format!("{ir}*"),
            &ptr.name,
            &[("i64", "0".to_string()), ("i64", "0".to_string())],
        );
        Variable::new(reg, self.ty("%cstr", 0, 0).expect("%cstr seeded"))
    }

    // -- lists --------------------------------------------------------------

    /// Builds a `{i64 len, i64 cap, T* data}` value on the stack: mallocs
    /// a `T` array the size of `values` via the libc `malloc` external,
    /// stores each element into it, then stores the three fields into a
    /// freshly allocated slot and returns its loaded value.
    pub fn new_list(&mut self, values: &[Variable]) -> Variable {
        let elem_ty = values.first().map(|v| v.ty.clone()).unwrap_or_else(|| self.ty("%i8", 0, 0).unwrap());
        let tname = format!("%list.{}", elem_ty.name.trim_start_matches('%'));
        let elem_ir = elem_ty.to_llvm_ir().to_string();
        let list_ty = self.ty_or_declare(&tname, &format!("{{ i64, i64, {elem_ir}* }}"));
        let list_ir = list_ty.to_llvm_ir().to_string();
        let len = values.len() as u64;

        let ptr_ty = self.ty("%ptr", 0, 0).expect("%ptr seeded");
        let i64_ty = self.ty("%i64", 0, 0).expect("%i64 seeded");
        self.add_external("@malloc", ptr_ty, vec![i64_ty]);

        let f = self.current_fn_mut();
        // No target data layout is available to size `elem_ir` directly, so
        // compute its byte size the classic way: index one element past a
        // null pointer and measure the resulting offset.
        let size_ptr = f.llvm.get_element_ptr(&elem_ir, &format!("{elem_ir}*"), "null", &[("i64", "1".to_string())]);
        let elem_bytes = f.llvm.ptrtoint(&format!("{elem_ir}*"), "i64", &size_ptr);
        let total_bytes = f.llvm.mul("i64", &elem_bytes, &len.max(1).to_string());
        let raw = f.llvm.call("i8*", "@malloc", &[("i64".to_string(), total_bytes)]).expect("malloc returns i8*");
        let data = f.llvm.bitcast("i8*", &format!("{elem_ir}*"), &raw);
        for (i, v) in values.iter().enumerate() {
            let elem_ptr = f.llvm.get_element_ptr(&elem_ir, &format!("{elem_ir}*"), &data, &[("i64", i.to_string())]);
            f.llvm.store(&elem_ir, &v.name, &format!("{elem_ir}*"), &elem_ptr);
        }

        let slot = f.llvm.alloca(&list_ir, None);
        let len_ptr = f.llvm.get_element_ptr(
            &list_ir,
            &format!("{list_ir}*"),
            &slot,
            &[("i32", "0".into()), ("i32", "0".into())],
        );
        f.llvm.store("i64", &len.to_string(), "i64*", &len_ptr);
        let cap_ptr = f.llvm.get_element_ptr(
            &list_ir,
            &format!("{list_ir}*"),
            &slot,
            &[("i32", "0".into()), ("i32", "1".into())],
        );
        f.llvm.store("i64", &len.to_string(), "i64*", &cap_ptr);
        let data_ptr = f.llvm.get_element_ptr(
            &list_ir,
            &format!("{list_ir}*"),
            &slot,
            &[("i32", "0".into()), ("i32", "2".into())],
        );
        f.llvm.store(&format!("{elem_ir}*"), &data, &format!("{elem_ir}**"), &data_ptr);

        let reg = f.llvm.load(&list_ir, &format!("{list_ir}*"), &slot);
        Variable::new(reg, list_ty)
    }

    // -- externals ------------------------------------------------------

    pub fn add_external(&mut self, name: &str, rtype: Type, args: Vec<Type>) {
        if self.externals.contains_key(name) {
            return;
        }
        self.externals.insert(name.to_string(), External { name: name.to_string(), rtype, args });
    }

    pub fn call_external(&mut self, name: &str, args: &[Variable], row: u32, col: u32) -> Result<Variable, IrError> {
        let external = self
            .externals
            .get(name)
            .cloned()
            .ok_or_else(|| IrError::new(IrErrorKind::UnknownOperation(name.to_string()), row, col))?;

        let mut call_args = Vec::new();
        for arg in args {
            call_args.push((arg.ty.to_llvm_ir().to_string(), arg.name.clone()));
        }

        let mut extype = external.rtype.to_llvm_ir().to_string();
        if external.args.iter().any(|a| a.name == "%vararg") {
            let parts: Vec<_> = external.args.iter().map(|a| a.to_llvm_ir().to_string()).collect();
            extype = format!("{}({})", extype, parts.join(", "));
        }

        let reg = self.current_fn_mut().llvm.call(&extype, name, &call_args);
        Ok(match reg {
            Some(r) => Variable::new(r, external.rtype),
            None => Variable::new("%void", external.rtype),
        })
    }

    // -- casts ------------------------------------------------------------

    /// Only float-widening (`%f32` -> `%f64`) is defined; anything else
    /// is a `CastError` rather than a silent no-op.
    pub fn cast(&mut self, name: &str, to: &str, row: u32, col: u32) -> Result<Variable, IrError> {
        let var = self.variable(name, row, col)?;
        let target = self.ty(to, row, col)?;
        if var.ty.name.starts_with("%f") && target.name == "%f64" {
            let from_ir = var.ty.to_llvm_ir().to_string();
            let to_ir = target.to_llvm_ir().to_string();
            let reg = self.current_fn_mut().llvm.fpext(&from_ir, &to_ir, &var.name);
            return Ok(Variable::new(reg, target));
        }
        Err(IrError::new(IrErrorKind::CastError { from: var.ty.name, to: target.name }, row, col))
    }

    /// Direct access to the current function's instruction buffer, for
    /// the built-in catalog's hand-rolled bodies (a single primitive
    /// instruction each, below the level `call`/`cast`/etc. operate at).
    pub fn emit(&mut self) -> &mut crate::llvm::Llvm {
        &mut self.current_fn_mut().llvm
    }

    pub fn mark_internal(&mut self) {
        self.current_fn_mut().internal = true;
    }

    // -- name mangling and dispatch ---------------------------------------

    /// Strips a type name's leading sigil (`%i32` -> `i32`); type names
    /// are the only mangled component that carries one; the operator
    /// name is taken as-is so the literal `@` index operator survives.
    fn mangle_type(raw: &str) -> String {
        raw.strip_prefix('%').unwrap_or(raw).replace('"', "\\\"")
    }

    fn mangle_op(raw: &str) -> String {
        raw.replace('"', "\\\"")
    }

    pub fn mangle_name(fname: &str, ltype: &str, rtype: &str) -> String {
        format!(
            "@\"{};{};{}\"",
            Self::mangle_type(ltype),
            Self::mangle_op(fname),
            Self::mangle_type(rtype)
        )
    }

    pub fn call(&mut self, op: &str, left: Option<&Variable>, right: Option<&Variable>, row: u32, col: u32) -> Result<Variable, IrError> {
        let mut args = Vec::new();
        let ltype = match left {
            Some(l) if !l.is_void() => {
                args.push((l.ty.to_llvm_ir().to_string(), l.name.clone()));
                l.ty.name.clone()
            }
            _ => "%void".to_string(),
        };
        let rtype = match right {
            Some(r) if !r.is_void() => {
                args.push((r.ty.to_llvm_ir().to_string(), r.name.clone()));
                r.ty.name.clone()
            }
            _ => "%void".to_string(),
        };

        let call_name = Self::mangle_name(op, &ltype, &rtype);
        let rtype_out = {
            let func = self
                .functions
                .get_mut(&call_name)
                .ok_or_else(|| IrError::new(IrErrorKind::UnknownOperation(call_name.clone()), row, col))?;
            func.used = true;
            func.rtype.clone()
        };

        let ir = rtype_out.to_llvm_ir().to_string();
        let reg = self.current_fn_mut().llvm.call(&ir, &call_name, &args);
        Ok(match reg {
            Some(r) => Variable::new(r, rtype_out),
            None => Variable::new("%void", rtype_out),
        })
    }

    pub fn ret(&mut self, value: &Variable) {
        let ir = value.ty.to_llvm_ir().to_string();
        let f = self.current_fn_mut();
        f.rtype = value.ty.clone();
        if value.is_void() {
            f.llvm.ret(&ir, None);
        } else {
            f.llvm.ret(&ir, Some(&value.name));
        }
    }

    pub fn negate(&mut self, value: &Variable) -> Variable {
        let reg = self.current_fn_mut().llvm.icmp("eq", "i1", &value.name, "0");
        Variable::new(reg, self.ty("%bool", 0, 0).expect("%bool seeded"))
    }

    // -- scoped emission contexts -----------------------------------------

    /// Switches `current` to a fresh function with the given unmangled
    /// name. The `FunctionGuard`'s `Drop` remangles it from the parameter
    /// types observed during emission, registers it, and restores the
    /// previous `current`.
    pub fn begin_function(&mut self, name: &str) -> FunctionGuard<'_> {
        self.pending_seq += 1;
        let key = format!("@pending.{}", self.pending_seq);
        let void_ty = self.ty("%void", 0, 0).expect("%void seeded");
        self.functions.insert(key.clone(), Function::new(&key, void_ty));
        self.current_stack.push(self.current.clone());
        self.current = key.clone();
        FunctionGuard { module: self, name: name.to_string(), key }
    }

    pub fn if_then(&mut self, cond: &Variable) -> IfThenGuard<'_> {
        let tlbl = self.current_fn_mut().llvm.next_lbl();
        let flbl = self.current_fn_mut().llvm.next_lbl();
        let f = self.current_fn_mut();
        f.llvm.comment("if");
        f.llvm.br_if_else(&cond.name, &tlbl, &flbl);
        f.llvm.label(&tlbl);
        IfThenGuard { module: self, flbl }
    }

    pub fn loop_(&mut self) -> LoopGuard<'_> {
        let slbl = self.current_fn_mut().llvm.next_lbl();
        let elbl = self.current_fn_mut().llvm.next_lbl();
        let f = self.current_fn_mut();
        f.llvm.comment("repeat");
        f.llvm.br(&slbl);
        f.llvm.label(&slbl);
        LoopGuard { module: self, slbl, elbl }
    }

    // -- serialization ------------------------------------------------------

    pub fn to_llvm_ir(&self) -> String {
        let mut out = String::new();

        out.push_str("; Declared types:\n");
        for ty in self.types.values() {
            if ty.primitive {
                continue;
            }
            out.push_str(&format!("{} = type {}\n", ty.name, ty.repr));
        }
        out.push('\n');

        out.push_str("; Globals and constants:\n");
        for var in self.variables.values() {
            match &var.value {
                Some(v) => out.push_str(&format!("{} = constant {} {}\n", var.name, var.ty.to_llvm_ir(), v)),
                None => out.push_str(&format!("{} = constant {}\n", var.name, var.ty.to_llvm_ir())),
            }
        }
        out.push('\n');

        out.push_str("; Externals\n");
        for ext in self.externals.values() {
            let args: Vec<_> = ext.args.iter().map(|a| a.to_llvm_ir().to_string()).collect();
            out.push_str(&format!("declare {} {}({})\n", ext.rtype.to_llvm_ir(), ext.name, args.join(", ")));
        }
        out.push('\n');

        out.push_str("; Functions:\n");
        for func in self.functions.values() {
            if !func.used {
                continue;
            }
            let args: Vec<_> = func.args.values().map(|a| format!("{} {}", a.ty.to_llvm_ir(), a.name)).collect();
            out.push_str(&format!(
                "define {} {} {}({})\n{{\n",
                if func.internal { "internal" } else { "external" },
                func.rtype.to_llvm_ir(),
                func.name,
                args.join(", ")
            ));
            out.push_str(&func.llvm.code);
            if func.name == "@main" {
                let already_returns =
                    func.llvm.code.trim_end().rsplit('\n').next().unwrap_or("").trim_start().starts_with("ret ");
                if !already_returns {
                    out.push_str("    ret i32 0\n");
                }
            }
            out.push_str("}\n\n");
        }

        out
    }
}

/// A RAII handle over `Module` while a user-defined operation's body is
/// being emitted. Derefs to `Module` so the generator can keep calling
/// ordinary module operations; on drop, remangles the function by its
/// observed `%left`/`%right` argument types and restores `current`.
pub struct FunctionGuard<'a> {
    module: &'a mut Module,
    name: String,
    key: String,
}

impl Drop for FunctionGuard<'_> {
    fn drop(&mut self) {
        let mut func = self.module.functions.shift_remove(&self.key).expect("pending function exists");
        let left = func.args.get("%left").map(|v| v.ty.name.clone()).unwrap_or_else(|| "%void".to_string());
        let right = func.args.get("%right").map(|v| v.ty.name.clone()).unwrap_or_else(|| "%void".to_string());
        let mangled = Module::mangle_name(&self.name, &left, &right);
        func.name = mangled.clone();
        self.module.functions.insert(mangled, func);
        self.module.current = self.module.current_stack.pop().expect("begin_function pushed a frame");
    }
}

impl Deref for FunctionGuard<'_> {
    type Target = Module;
    fn deref(&self) -> &Module {
        self.module
    }
}

impl DerefMut for FunctionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Module {
        self.module
    }
}

pub struct IfThenGuard<'a> {
    module: &'a mut Module,
    flbl: String,
}

impl Drop for IfThenGuard<'_> {
    fn drop(&mut self) {
        let f = self.module.current_fn_mut();
        f.llvm.br(&self.flbl);
        f.llvm.label(&self.flbl);
        f.llvm.line("");
    }
}

impl Deref for IfThenGuard<'_> {
    type Target = Module;
    fn deref(&self) -> &Module {
        self.module
    }
}

impl DerefMut for IfThenGuard<'_> {
    fn deref_mut(&mut self) -> &mut Module {
        self.module
    }
}

pub struct LoopGuard<'a> {
    module: &'a mut Module,
    slbl: String,
    elbl: String,
}

impl LoopGuard<'_> {
    /// Emits a branch to the loop's end label -- used by `repeat` to
    /// break out once its guard condition is false.
    pub fn end(&mut self) {
        self.module.current_fn_mut().llvm.br(&self.elbl);
    }
}

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        let f = self.module.current_fn_mut();
        f.llvm.br(&self.slbl);
        f.llvm.label(&self.elbl);
        f.llvm.line("");
    }
}

impl Deref for LoopGuard<'_> {
    type Target = Module;
    fn deref(&self) -> &Module {
        self.module
    }
}

impl DerefMut for LoopGuard<'_> {
    fn deref_mut(&mut self) -> &mut Module {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_name_strips_sigils() {
        assert_eq!(Module::mangle_name("+", "%i32", "%i32"), "@\"i32;+;i32\"");
    }

    #[test]
    fn mangle_name_keeps_the_index_operator_symbol() {
        assert_eq!(Module::mangle_name("@", "%cstr", "%i32"), "@\"cstr;@;i32\"");
    }

    #[test]
    fn new_variable_allocates_and_resolves() {
        let mut m = Module::new();
        let i32_ty = m.ty("%i32", 1, 1).unwrap();
        m.new_variable("%x", i32_ty, 1, 1).unwrap();
        let v = m.variable("%x", 1, 1).unwrap();
        assert_eq!(v.ty.name, "%i32");
    }

    #[test]
    fn duplicate_variable_is_an_error() {
        let mut m = Module::new();
        let i32_ty = m.ty("%i32", 1, 1).unwrap();
        m.new_variable("%x", i32_ty.clone(), 1, 1).unwrap();
        let err = m.new_variable("%x", i32_ty, 1, 1).unwrap_err();
        assert!(matches!(err.kind, IrErrorKind::DuplicatedVariable(_)));
    }

    #[test]
    fn undeclared_variable_is_an_error() {
        let mut m = Module::new();
        let err = m.variable("%nope", 1, 1).unwrap_err();
        assert!(matches!(err.kind, IrErrorKind::UnknownSymbol(_)));
    }

    #[test]
    fn const_ptr_null_is_the_bare_llvm_immediate() {
        let mut m = Module::new();
        let v = m.const_ptr_null();
        assert_eq!(v.name, "null");
        assert_eq!(v.ty.name, "%ptr");
    }

    #[test]
    fn const_interning_reuses_the_same_global() {
        let mut m = Module::new();
        let a = m.const_i32(42);
        let before = m.variables.len();
        let b = m.const_i32(42);
        assert_eq!(m.variables.len(), before);
        assert_eq!(a.name, b.name);
    }

    #[test]
    fn builtin_i32_add_is_registered_and_usable() {
        let mut m = Module::new();
        let a = m.const_i32(1);
        let b = m.const_i32(2);
        let result = m.call("+", Some(&a), Some(&b), 1, 1).unwrap();
        assert_eq!(result.ty.name, "%i32");
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let mut m = Module::new();
        let a = m.const_i32(1);
        let err = m.call("frobnicate", Some(&a), None, 1, 1).unwrap_err();
        assert!(matches!(err.kind, IrErrorKind::UnknownOperation(_)));
    }

    #[test]
    fn cast_only_supports_float_widening() {
        let mut m = Module::new();
        let f32_ty = m.ty("%f32", 1, 1).unwrap();
        m.new_variable("%x", f32_ty, 1, 1).unwrap();
        let widened = m.cast("%x", "%f64", 1, 1).unwrap();
        assert_eq!(widened.ty.name, "%f64");

        let i32_ty = m.ty("%i32", 1, 1).unwrap();
        m.new_variable("%y", i32_ty, 1, 1).unwrap();
        let err = m.cast("%y", "%f64", 1, 1).unwrap_err();
        assert!(matches!(err.kind, IrErrorKind::CastError { .. }));
    }

    #[test]
    fn unused_function_is_pruned_from_output() {
        let m = Module::new();
        let ir = m.to_llvm_ir();
        assert!(ir.contains("@main"));
        // A catalog entry that's never called should not appear.
        assert!(!ir.contains("@\"i32;frobnicate;i32\""));
    }

    #[test]
    fn function_guard_registers_under_mangled_name() {
        let mut m = Module::new();
        {
            let mut guard = m.begin_function("twice");
            let i32_ty = guard.ty("%i32", 1, 1).unwrap();
            guard.new_variable("%right", i32_ty, 1, 1).unwrap();
        }
        assert!(m.functions.contains_key("@\"void;twice;i32\""));
    }
}

//! Registers the fixed catalog of primitive operations at module
//! construction time: arithmetic and comparison overloads, pointer
//! indexing, and `print`/`println` for every primitive type.
//!
//! Each entry is built through [`Module::begin_function`] exactly like a
//! user-defined operator overload (`is { ... }`) would be -- the only
//! difference is `mark_internal()` and a hand-picked body of one or two
//! primitive instructions instead of a generated AST.

use crate::module::Module;
use crate::variable::Variable;

pub fn register(module: &mut Module) {
    arithmetic(module);
    comparisons(module);
    indexing(module);
    console_output(module);
}

fn arithmetic(module: &mut Module) {
    binary_op(module, "+", "%i32", "%i32", "%i32", |llvm, ty, l, r| llvm.add(ty, l, r));
    binary_op(module, "-", "%i32", "%i32", "%i32", |llvm, ty, l, r| llvm.sub(ty, l, r));
    binary_op(module, "*", "%i32", "%i32", "%i32", |llvm, ty, l, r| llvm.mul(ty, l, r));
    binary_op(module, "/", "%i32", "%i32", "%i32", |llvm, ty, l, r| llvm.sdiv(ty, l, r));

    binary_op(module, "+", "%f32", "%f32", "%f32", |llvm, ty, l, r| llvm.fadd(ty, l, r));
    binary_op(module, "-", "%f32", "%f32", "%f32", |llvm, ty, l, r| llvm.fsub(ty, l, r));
    binary_op(module, "*", "%f32", "%f32", "%f32", |llvm, ty, l, r| llvm.fmul(ty, l, r));
    binary_op(module, "/", "%f32", "%f32", "%f32", |llvm, ty, l, r| llvm.fdiv(ty, l, r));
}

fn comparisons(module: &mut Module) {
    icmp_op(module, "<", "%i32", "slt");
    icmp_op(module, ">", "%i32", "sgt");
    icmp_op(module, "==", "%i32", "eq");
    icmp_op(module, "==", "%i8", "eq");
    icmp_op(module, "==", "%ptr", "eq");
}

fn indexing(module: &mut Module) {
    // %cstr.ptr @ %i32 -> %cstr: index an array of strings.
    {
        let mut fg = module.begin_function("@");
        fg.mark_internal();
        let cstr_ptr = fg.ty("%cstr.ptr", 0, 0).unwrap();
        let i32_ty = fg.ty("%i32", 0, 0).unwrap();
        let cstr_ty = fg.ty("%cstr", 0, 0).unwrap();
        fg.new_variable("%left", cstr_ptr, 0, 0).unwrap();
        fg.new_variable("%right", i32_ty, 0, 0).unwrap();
        let cstr_ir = cstr_ty.to_llvm_ir().to_string();
        let ptr = fg
            .emit()
            .get_element_ptr(&cstr_ir, &format!("{cstr_ir}*"), "%left", &[("i32", "%right".into())]);
        let reg = fg.emit().load(&cstr_ir, &format!("{cstr_ir}*"), &ptr);
        let result = Variable::new(reg, cstr_ty);
        fg.ret(&result);
    }
    // %cstr @ %i32 -> %i8: index a raw byte string.
    {
        let mut fg = module.begin_function("@");
        fg.mark_internal();
        let cstr_ty = fg.ty("%cstr", 0, 0).unwrap();
        let i32_ty = fg.ty("%i32", 0, 0).unwrap();
        let i8_ty = fg.ty("%i8", 0, 0).unwrap();
        fg.new_variable("%left", cstr_ty, 0, 0).unwrap();
        fg.new_variable("%right", i32_ty, 0, 0).unwrap();
        let i8_ir = i8_ty.to_llvm_ir().to_string();
        let ptr = fg.emit().get_element_ptr(&i8_ir, "%cstr", "%left", &[("i32", "%right".into())]);
        let reg = fg.emit().load(&i8_ir, "%cstr", &ptr);
        let result = Variable::new(reg, i8_ty);
        fg.ret(&result);
    }
}

/// Builds one `(ltype, rtype) -> rtype` operator overload whose body is
/// a single two-operand instruction on `%left`/`%right`.
fn binary_op(
    module: &mut Module,
    name: &str,
    ltype: &str,
    rtype: &str,
    out_type: &str,
    emit: impl FnOnce(&mut crate::llvm::Llvm, &str, &str, &str) -> String,
) {
    let mut fg = module.begin_function(name);
    fg.mark_internal();
    let l = fg.ty(ltype, 0, 0).unwrap();
    let r = fg.ty(rtype, 0, 0).unwrap();
    let out = fg.ty(out_type, 0, 0).unwrap();
    fg.new_variable("%left", l.clone(), 0, 0).unwrap();
    fg.new_variable("%right", r, 0, 0).unwrap();
    let ir = l.to_llvm_ir().to_string();
    let reg = emit(fg.emit(), &ir, "%left", "%right");
    let result = Variable::new(reg, out);
    fg.ret(&result);
}

fn icmp_op(module: &mut Module, name: &str, operand_type: &str, predicate: &str) {
    let mut fg = module.begin_function(name);
    fg.mark_internal();
    let operand = fg.ty(operand_type, 0, 0).unwrap();
    let bool_ty = fg.ty("%bool", 0, 0).unwrap();
    fg.new_variable("%left", operand.clone(), 0, 0).unwrap();
    fg.new_variable("%right", operand.clone(), 0, 0).unwrap();
    let ir = operand.to_llvm_ir().to_string();
    let reg = fg.emit().icmp(predicate, &ir, "%left", "%right");
    let result = Variable::new(reg, bool_ty);
    fg.ret(&result);
}

/// One `printf` call against a literal format string, with either a
/// register operand or a second literal string argument.
enum Arg<'a> {
    Reg(&'a str, &'a str),
    Literal(&'a str),
}

fn emit_printf(module: &mut Module, pattern: &str, arg: Arg) {
    let pat = module.const_cstr(pattern);
    let (ty, reg) = match arg {
        Arg::Reg(t, r) => (t.to_string(), r.to_string()),
        Arg::Literal(s) => {
            let c = module.const_cstr(s);
            ("%cstr".to_string(), c.name)
        }
    };
    module
        .emit()
        .call("i32(%cstr, ...)", "@printf", &[("%cstr".to_string(), pat.name), (ty, reg)]);
}

fn print_fn(module: &mut Module, name: &str, rtype: &str, f: impl FnOnce(&mut Module)) {
    let mut fg = module.begin_function(name);
    fg.mark_internal();
    if rtype != "%void" {
        let ty = fg.ty(rtype, 0, 0).unwrap();
        fg.new_variable("%right", ty, 0, 0).unwrap();
    }
    f(&mut fg);
    let void_ty = fg.ty("%void", 0, 0).unwrap();
    fg.ret(&Variable::new("%void", void_ty));
}

fn console_output(module: &mut Module) {
    print_fn(module, "print", "%void", |m| emit_printf(m, "%s", Arg::Literal("void")));
    print_fn(module, "println", "%void", |m| emit_printf(m, "%s\n", Arg::Literal("void")));

    print_fn(module, "print", "%ptr", |m| print_ptr(m, "%s", "0x%08X"));
    print_fn(module, "println", "%ptr", |m| print_ptr(m, "%s\n", "0x%08X\n"));

    print_fn(module, "print", "%i32", |m| emit_printf(m, "%d", Arg::Reg("i32", "%right")));
    print_fn(module, "println", "%i32", |m| emit_printf(m, "%d\n", Arg::Reg("i32", "%right")));

    print_fn(module, "print", "%f32", |m| print_f32(m, "%f"));
    print_fn(module, "println", "%f32", |m| print_f32(m, "%f\n"));

    print_fn(module, "print", "%f64", |m| emit_printf(m, "%f", Arg::Reg("double", "%right")));
    print_fn(module, "println", "%f64", |m| emit_printf(m, "%f\n", Arg::Reg("double", "%right")));

    print_fn(module, "print", "%cstr", |m| emit_printf(m, "%s", Arg::Reg("%cstr", "%right")));
    print_fn(module, "println", "%cstr", |m| emit_printf(m, "%s\n", Arg::Reg("%cstr", "%right")));

    print_fn(module, "print", "%i8", |m| print_i8(m, "%c"));
    print_fn(module, "println", "%i8", |m| print_i8(m, "%c\n"));

    print_fn(module, "print", "%bool", |m| print_bool(m, "true", "false"));
    print_fn(module, "println", "%bool", |m| print_bool(m, "true\n", "false\n"));
}

fn print_ptr(module: &mut Module, null_pattern: &str, value_pattern: &str) {
    let is_null = module.emit().icmp("eq", "i8*", "%right", "null");
    let tlbl = module.emit().next_lbl();
    let flbl = module.emit().next_lbl();
    let end = module.emit().next_lbl();
    module.emit().br_if_else(&is_null, &tlbl, &flbl);

    module.emit().label(&tlbl);
    emit_printf(module, null_pattern, Arg::Literal("null"));
    module.emit().br(&end);

    module.emit().label(&flbl);
    emit_printf(module, value_pattern, Arg::Reg("i8*", "%right"));
    module.emit().br(&end);

    module.emit().label(&end);
}

fn print_f32(module: &mut Module, pattern: &str) {
    let widened = module.emit().fpext("float", "double", "%right");
    emit_printf(module, pattern, Arg::Reg("double", &widened));
}

/// Not present in the reference `printf`-based catalog: `%i8` values
/// are promoted to `i32` before the varargs call, matching C's integer
/// promotion of `char` arguments passed through `...`.
fn print_i8(module: &mut Module, pattern: &str) {
    let widened = module.emit().sext("i8", "i32", "%right");
    emit_printf(module, pattern, Arg::Reg("i32", &widened));
}

/// Also absent from the reference catalog: prints `true`/`false` text
/// rather than the raw `i1` bit pattern.
fn print_bool(module: &mut Module, true_text: &str, false_text: &str) {
    let tlbl = module.emit().next_lbl();
    let flbl = module.emit().next_lbl();
    let end = module.emit().next_lbl();
    module.emit().br_if_else("%right", &tlbl, &flbl);

    module.emit().label(&tlbl);
    emit_printf(module, true_text, Arg::Literal("true"));
    module.emit().br(&end);

    module.emit().label(&flbl);
    emit_printf(module, false_text, Arg::Literal("false"));
    module.emit().br(&end);

    module.emit().label(&end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_registers_i32_addition() {
        let module = Module::new();
        assert!(module.functions.contains_key("@\"i32;+;i32\""));
    }

    #[test]
    fn catalog_registers_print_for_every_primitive() {
        let module = Module::new();
        for rtype in ["void", "ptr", "bool", "i8", "i32", "f32", "f64", "cstr"] {
            let key = format!("@\"void;print;{rtype}\"");
            assert!(module.functions.contains_key(&key), "missing {key}");
        }
    }

    #[test]
    fn catalog_cstr_index_is_registered() {
        let module = Module::new();
        assert!(module.functions.contains_key("@\"cstr;@;i32\""));
    }
}

//! Pure signature predicates: does a function carry the configured
//! request-scoped handle parameter, and does it return the configured
//! status type.
//!
//! All checks are syntactic. Anonymous, multi-name, and destructuring
//! parameter patterns never match (conservative false), and qualified type
//! matching compares path segments verbatim with no alias resolution.

use crate::config::TracePattern;

/// Fixed display name shared by every closure in a file. A single directive
/// for this name toggles instrumentation for all closures at once.
pub const ANONYMOUS: &str = "anonymous";

/// Whether any parameter of the signature is the carrier parameter.
pub fn has_carrier_param(sig: &syn::Signature, pattern: &TracePattern) -> bool {
    sig.inputs.iter().any(|arg| match arg {
        // receivers (`self`, `&mut self`, ...) never match
        syn::FnArg::Receiver(_) => false,
        syn::FnArg::Typed(pat_type) => {
            is_single_name(&pat_type.pat, &pattern.carrier_name)
                && is_qualified_type(&pat_type.ty, &pattern.carrier_package, &pattern.carrier_type)
        }
    })
}

/// Closure variant of [`has_carrier_param`]. Closure parameters are bare
/// patterns; only the explicitly typed form `name: package::Type` matches.
pub fn closure_has_carrier_param(closure: &syn::ExprClosure, pattern: &TracePattern) -> bool {
    closure.inputs.iter().any(|pat| match pat {
        syn::Pat::Type(pat_type) => {
            is_single_name(&pat_type.pat, &pattern.carrier_name)
                && is_qualified_type(&pat_type.ty, &pattern.carrier_package, &pattern.carrier_type)
        }
        _ => false,
    })
}

/// Whether the return type is the configured status type: a bare
/// single-segment path whose identifier matches, generics ignored.
pub fn has_status_result(output: &syn::ReturnType, pattern: &TracePattern) -> bool {
    let syn::ReturnType::Type(_, ty) = output else {
        return false;
    };
    let syn::Type::Path(type_path) = ty.as_ref() else {
        return false;
    };
    type_path.qself.is_none()
        && type_path.path.leading_colon.is_none()
        && type_path.path.segments.len() == 1
        && type_path.path.segments[0].ident == pattern.status_type
}

/// Common span notation: `<receiver>.<function>`, or the bare function name
/// for free functions and closures.
pub fn span_name(receiver: &str, function: &str) -> String {
    if receiver.is_empty() {
        function.to_string()
    } else {
        format!("{receiver}.{function}")
    }
}

/// Receiver type name of an impl self type or trait object: the last path
/// segment, looking through references. Non-path types yield "".
pub fn type_receiver_name(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default(),
        syn::Type::Reference(reference) => type_receiver_name(&reference.elem),
        _ => String::new(),
    }
}

/// A pattern binding exactly one plain identifier equal to `name`.
/// `_`, tuples, structs, `ref` bindings, and subpatterns all fail.
fn is_single_name(pat: &syn::Pat, name: &str) -> bool {
    match pat {
        syn::Pat::Ident(pat_ident) => {
            pat_ident.by_ref.is_none() && pat_ident.subpat.is_none() && pat_ident.ident == name
        }
        _ => false,
    }
}

/// A bare two-segment path `package::Type` with no leading colons, no
/// qualified self, and no generic arguments on either segment.
fn is_qualified_type(ty: &syn::Type, package: &str, symbol: &str) -> bool {
    let syn::Type::Path(type_path) = ty else {
        return false;
    };
    if type_path.qself.is_some() || type_path.path.leading_colon.is_some() {
        return false;
    }
    let segments = &type_path.path.segments;
    segments.len() == 2
        && segments.iter().all(|segment| segment.arguments.is_none())
        && segments[0].ident == package
        && segments[1].ident == symbol
}

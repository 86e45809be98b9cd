//! `#[listener]` attribute implementation.
//!
//! Turns the `#[handler]` methods of an inherent impl block into a
//! `Listener::handlers` table. The parameter of each handler picks the
//! registration path:
//!
//! | Handler shape | Generated entry |
//! |---------------|-----------------|
//! | `fn h(&self, event: &T)` | `handlers.on("h", ..)` for exact type `T` |
//! | `fn h(&self, event: &BoxedEvent)` | `handlers.on_any("h", ..)` |
//! | `fn h(&self, event: &dyn Event)` | `handlers.on_any("h", ..)` |
//! | `fn h(&self)` | `handlers.missing_parameter("h")` |
//!
//! `#[handler(any)]` asserts the second or third shape and rejects any other
//! parameter type. Both `async fn` and plain `fn` handlers are accepted.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, Type, TypeParamBound,
    meta::ParseNestedMeta,
    spanned::Spanned,
};

/// Arguments of `#[listener(...)]`.
#[derive(Default)]
pub struct ListenerArgs {
    name: Option<LitStr>,
}

impl ListenerArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unknown listener attribute, expected `name`"))
        }
    }
}

/// How a handler receives its event.
enum HandlerKind {
    Exact(Type),
    Any,
    Missing,
}

struct HandlerMethod {
    name: LitStr,
    method: syn::Ident,
    kind: HandlerKind,
    is_async: bool,
}

pub fn expand_listener(args: ListenerArgs, mut item: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new(
            path.span(),
            "#[listener] must be placed on an inherent impl block",
        ));
    }

    let mut handlers = Vec::new();
    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            handlers.extend(take_handler(method)?);
        }
    }

    let entries = handlers.iter().map(generate_entry);
    let listener_name = args.name.map(|name| {
        quote! {
            fn listener_name(&self) -> &'static str {
                #name
            }
        }
    });

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    Ok(quote! {
        #item

        impl #impl_generics ::herald_core::Listener for #self_ty #where_clause {
            fn handlers(handlers: &mut ::herald_core::Handlers<Self>) {
                #(#entries)*
            }

            #listener_name
        }
    })
}

/// Strips the `#[handler]` attribute from `method` and describes the handler.
///
/// Returns `None` for methods without the attribute.
fn take_handler(method: &mut ImplItemFn) -> syn::Result<Option<HandlerMethod>> {
    let Some(index) = method
        .attrs
        .iter()
        .position(|attr| attr.path().is_ident("handler"))
    else {
        return Ok(None);
    };
    let attr = method.attrs.remove(index);

    let mut force_any = false;
    if matches!(attr.meta, syn::Meta::List(_)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("any") {
                force_any = true;
                Ok(())
            } else {
                Err(meta.error("unknown handler attribute, expected `any`"))
            }
        })?;
    }

    let sig = &method.sig;
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new(
                sig.span(),
                "handler methods must take `&self` as their first parameter",
            ));
        }
    }

    let params: Vec<_> = sig.inputs.iter().skip(1).collect();
    let kind = match params.as_slice() {
        [] => HandlerKind::Missing,
        [FnArg::Typed(param)] => {
            let Type::Reference(reference) = param.ty.as_ref() else {
                return Err(syn::Error::new(
                    param.ty.span(),
                    "handler event parameters must be references, e.g. `event: &MyEvent`",
                ));
            };
            if is_any_event(&reference.elem) {
                HandlerKind::Any
            } else if force_any {
                return Err(syn::Error::new(
                    reference.elem.span(),
                    "`#[handler(any)]` handlers take `&BoxedEvent` or `&dyn Event`",
                ));
            } else {
                HandlerKind::Exact((*reference.elem).clone())
            }
        }
        [FnArg::Receiver(receiver)] => {
            return Err(syn::Error::new(receiver.span(), "unexpected receiver"));
        }
        [_, extra, ..] => {
            return Err(syn::Error::new(
                extra.span(),
                "handlers take exactly one event parameter",
            ));
        }
    };

    Ok(Some(HandlerMethod {
        name: LitStr::new(&sig.ident.to_string(), sig.ident.span()),
        method: sig.ident.clone(),
        kind,
        is_async: sig.asyncness.is_some(),
    }))
}

fn is_any_event(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "BoxedEvent"),
        Type::TraitObject(object) => object.bounds.iter().any(|bound| match bound {
            TypeParamBound::Trait(bound) => bound
                .path
                .segments
                .last()
                .is_some_and(|segment| segment.ident == "Event"),
            _ => false,
        }),
        Type::Paren(inner) => is_any_event(&inner.elem),
        _ => false,
    }
}

fn generate_entry(handler: &HandlerMethod) -> TokenStream {
    let HandlerMethod {
        name,
        method,
        kind,
        is_async,
    } = handler;
    let call = if *is_async {
        quote!(this.#method(&event).await)
    } else {
        quote!(this.#method(&event))
    };

    match kind {
        HandlerKind::Exact(ty) => quote! {
            handlers.on(
                #name,
                |this: ::std::sync::Arc<Self>, event: ::std::sync::Arc<#ty>| async move { #call },
            );
        },
        HandlerKind::Any => quote! {
            handlers.on_any(
                #name,
                |this: ::std::sync::Arc<Self>, event: ::herald_core::BoxedEvent| async move { #call },
            );
        },
        HandlerKind::Missing => quote! {
            handlers.missing_parameter(#name);
        },
    }
}

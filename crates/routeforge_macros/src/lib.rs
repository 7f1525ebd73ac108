use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat};

/// Time a system when the `perf_stats` feature is enabled.
///
/// Logs `[PERF] name: elapsed` through Bevy's `info!` when the call took
/// longer than the threshold (milliseconds, default 1). If the function
/// takes a `frame` parameter of type `Res<RouteFrame>` / `ResMut<RouteFrame>`,
/// it also logs every 100th frame regardless of duration.
///
/// Without `perf_stats` the attribute leaves the function untouched.
///
/// # Example
/// ```ignore
/// #[profile(30)]
/// pub fn advance_route_jobs(mut frame: ResMut<RouteFrame>, /* ... */) { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let lit = parse_macro_input!(attr as LitInt);
        match lit.base10_parse() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name = sig.ident.to_string();

    let has_frame_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else { return false };
        let Pat::Ident(pat_ident) = &*pat_type.pat else { return false };
        pat_ident.ident == "frame" && pat_type.ty.to_token_stream().to_string().contains("RouteFrame")
    });

    let frame_value = if has_frame_param {
        quote! { Some(frame.0) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    frame: Option<u64>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let sampled = self.frame.is_some_and(|f| f % 100 == 0);
                        if elapsed.as_millis() > #threshold_ms || sampled {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name,
                    start: std::time::Instant::now(),
                    frame: #frame_value,
                }
            };

            #block
        }
    };

    output.into()
}

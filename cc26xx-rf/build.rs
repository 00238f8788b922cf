use std::env;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use proc_macro2::{Literal, TokenStream};
use quote::format_ident;
use quote::quote;

mod build_serde;
use build_serde::{parse_hex, Block, Peripherals};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let chip_name = match env::vars()
        .map(|(a, _)| a)
        .filter(|x| x.starts_with("CARGO_FEATURE_CC26"))
        .get_one()
    {
        Ok(x) => x,
        Err(GetOneError::None) => panic!("No cc26xx chip Cargo feature enabled"),
        Err(GetOneError::Multiple) => panic!("Multiple cc26xx chip Cargo features enabled"),
    }
    .strip_prefix("CARGO_FEATURE_")
    .unwrap()
    .to_ascii_lowercase();

    println!("cargo:rerun-if-changed=data/{}", chip_name);
    println!("cargo:rerun-if-changed=build_serde.rs");
    let data_dir = Path::new("data").join(&chip_name);

    // Read and parse peripherals.yaml
    let peripherals_path = data_dir.join("peripherals.yaml");
    let peripherals_content = fs::read_to_string(&peripherals_path)
        .map_err(|e| format!("Failed to read peripherals.yaml: {}", e))?;
    let peripherals: Peripherals = serde_yaml::from_str(&peripherals_content)
        .map_err(|e| format!("Failed to parse peripherals.yaml: {}", e))?;

    let mut token_stream = TokenStream::new();

    // Generate peripherals singleton
    token_stream.extend(generate_peripherals_singleton(&peripherals));

    // Generate one register module per block
    let mut blocks = TokenStream::new();
    for peripheral in &peripherals.peripherals {
        let block_path = data_dir.join(format!("{}.yaml", peripheral.name));
        let block_content = fs::read_to_string(&block_path)
            .map_err(|e| format!("Failed to read {}.yaml: {}", peripheral.name, e))?;
        let block: Block = serde_yaml::from_str(&block_content)
            .map_err(|e| format!("Failed to parse {}.yaml: {}", peripheral.name, e))?;

        blocks.extend(generate_register_block(peripheral, &block)?);
    }

    token_stream.extend(quote! {
        /// Register addresses and bit fields, generated from `data/<chip>/*.yaml`.
        pub mod regs {
            #blocks
        }
    });

    // Get output path from env
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let dest_path = out_dir.join("_generated.rs");

    let mut file = File::create(&dest_path).unwrap();
    write!(file, "{}", token_stream).unwrap();
    rustfmt(&dest_path);

    Ok(())
}

fn generate_peripherals_singleton(peripherals: &Peripherals) -> TokenStream {
    let names: Vec<_> = peripherals
        .peripherals
        .iter()
        .map(|p| format_ident!("{}", p.name))
        .collect();

    quote! {
        embassy_hal_internal::peripherals! {
            #(#names,)*
        }
    }
}

fn generate_register_block(
    peripheral: &build_serde::Peripheral,
    block: &Block,
) -> Result<TokenStream, String> {
    let base = parse_hex(&peripheral.base)? as usize;
    let base_lit = Literal::usize_unsuffixed(base);
    let mod_ident = format_ident!("{}", peripheral.name.to_lowercase());
    let block_doc = peripheral
        .description
        .clone()
        .unwrap_or_else(|| peripheral.name.clone());

    let mut registers = TokenStream::new();
    for register in &block.registers {
        let offset = parse_hex(&register.offset)? as usize;
        let addr_lit = Literal::usize_unsuffixed(base + offset);
        let reg_ident = format_ident!("{}", register.name.to_uppercase());
        let fields_mod_ident = format_ident!("{}", register.name.to_lowercase());
        let reg_name = format!("{}.{}", peripheral.name, register.name);
        let reg_doc = register
            .description
            .clone()
            .unwrap_or_else(|| reg_name.clone());

        let mut fields = TokenStream::new();
        for field in &register.fields {
            if field.width == 0 || field.bit as u32 + field.width as u32 > 32 {
                return Err(format!(
                    "{}.{} does not fit in a 32-bit register",
                    reg_name, field.name
                ));
            }
            let field_ident = format_ident!("{}", field.name.to_uppercase());
            let pos = Literal::u8_unsuffixed(field.bit);
            let width = Literal::u8_unsuffixed(field.width);
            let doc = field.description.clone().unwrap_or_else(|| field.name.clone());
            fields.extend(quote! {
                #[doc = #doc]
                pub const #field_ident: Field = Field::new(#pos, #width);
            });
        }

        registers.extend(quote! {
            #[doc = #reg_doc]
            pub const #reg_ident: Reg = Reg::new(#reg_name, #addr_lit);

            #[doc = concat!("Fields of `", #reg_name, "`.")]
            pub mod #fields_mod_ident {
                #[allow(unused_imports)]
                use crate::hw::Field;
                #fields
            }
        });
    }

    Ok(quote! {
        #[doc = #block_doc]
        pub mod #mod_ident {
            #[allow(unused_imports)]
            use crate::hw::{Field, Reg};

            /// Block base address.
            pub const BASE: usize = #base_lit;

            #registers
        }
    })
}

enum GetOneError {
    None,
    Multiple,
}

trait IteratorExt: Iterator {
    fn get_one(self) -> Result<Self::Item, GetOneError>;
}

impl<T: Iterator> IteratorExt for T {
    fn get_one(mut self) -> Result<Self::Item, GetOneError> {
        match self.next() {
            None => Err(GetOneError::None),
            Some(res) => match self.next() {
                Some(_) => Err(GetOneError::Multiple),
                None => Ok(res),
            },
        }
    }
}

/// rustfmt a given path.
/// Failures are logged to stderr and ignored.
fn rustfmt(path: impl AsRef<Path>) {
    let path = path.as_ref();
    match Command::new("rustfmt").args([path]).output() {
        Err(e) => {
            eprintln!("failed to exec rustfmt {:?}: {:?}", path, e);
        }
        Ok(out) => {
            if !out.status.success() {
                eprintln!("rustfmt {:?} failed:", path);
                eprintln!("=== STDOUT:");
                std::io::stderr().write_all(&out.stdout).unwrap();
                eprintln!("=== STDERR:");
                std::io::stderr().write_all(&out.stderr).unwrap();
            }
        }
    }
}

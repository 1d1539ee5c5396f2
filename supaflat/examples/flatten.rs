//! Flattens a generated database types file and prints placeholder validators.
//!
//! Run with: `cargo run --example flatten -- [types.ts] [supaflat.json]`
//!
//! Set `RUST_LOG=debug` to see skipped declarations.

use std::path::Path;
use supaflat::prelude::*;
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"export type Json =
  | string
  | number
  | boolean
  | null
  | { [key: string]: Json | undefined }
  | Json[]

export type Database = {
  auth: {
    Enums: {
      aal_level: "aal1" | "aal2" | "aal3"
    }
  }
  public: {
    Tables: {
      sessions: {
        Row: {
          id: string
          aal: Database["auth"]["Enums"]["aal_level"] | null
          scopes: []
        }
        Insert: {
          id?: string
          aal?: Database["auth"]["Enums"]["aal_level"] | null
        }
        Relationships: []
      }
    }
    Functions: {
      revoke_session: {
        Args: { session_id: string }
        Returns: boolean
      }
    }
    Enums: {
      [_ in never]: never
    }
  }
}
"#;

/// Emits a `z.custom` placeholder per flattened declaration.
struct PlaceholderValidators;

impl ValidatorGenerator for PlaceholderValidators {
    fn generate(&self, types_source: &str, import_path: &str) -> ValidatorOutput {
        let mut validators = format!(
            "import {{ z }} from \"zod\";\nimport type * as types from \"{}\";\n\n",
            import_path
        );
        let mut inferred_types = String::from("import { z } from \"zod\";\n\n");

        for line in types_source.lines() {
            let Some((name, _)) = line
                .strip_prefix("export type ")
                .and_then(|rest| rest.split_once(" ="))
            else {
                continue;
            };
            let validator = self.validator_name(name);
            validators.push_str(&format!(
                "export const {} = z.custom<types.{}>();\n",
                validator, name
            ));
            inferred_types.push_str(&format!(
                "export type {} = z.infer<typeof {}>;\n",
                self.inferred_type_name(name),
                validator
            ));
        }

        ValidatorOutput {
            validators,
            inferred_types,
            errors: Vec::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("supaflat=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let source = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_string(),
    };
    let config = match args.next() {
        Some(path) => Config::from_path(Path::new(&path))?,
        None => Config::default(),
    };

    let output = Generator::new(&config.naming_config, &PlaceholderValidators)
        .generate(&source, &GenerateRequest::for_schemas(["public"]))?;

    println!("// ---- database.types.ts ----");
    print!("{}", output.types_source);
    println!("\n// ---- schemas.ts ----");
    print!("{}", output.validators);
    if let Some(types) = &output.inferred_types {
        println!("\n// ---- types.ts ----");
        print!("{}", types);
    }

    for conflict in &output.report.conflicts {
        eprintln!(
            "conflict: {} kept as {}, {} not applied for {}",
            conflict.default, conflict.kept, conflict.rejected, conflict.type_name
        );
    }

    Ok(())
}

// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

const FILTERED_CRATES: &[&str] = &[
    // Noisy http and dns internals, nothing a user can act on.
    "hyper",
    "reqwest",
    "rustls",
    "mime",
    "want",
    "trust_dns_proto",
    "trust_dns_resolver",
];

pub struct CVar<T: Sized + Any + 'static> {
    pub name: &'static str,
    pub ty: PhantomData<T>,
    pub description: &'static str,
    pub mutable: bool,
    pub serializable: bool,
    pub default: &'static (dyn Fn() -> T + Sync),
}

impl Var for CVar<i64> {
    fn serialize(&self, val: &Box<dyn Any>) -> String {
        val.downcast_ref::<i64>().unwrap().to_string()
    }

    fn deserialize(&self, input: &str) -> Box<dyn Any> {
        Box::new(input.parse::<i64>().unwrap_or(0))
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn can_serialize(&self) -> bool {
        self.serializable
    }
}

impl Var for CVar<bool> {
    fn serialize(&self, val: &Box<dyn Any>) -> String {
        val.downcast_ref::<bool>().unwrap().to_string()
    }

    fn deserialize(&self, input: &str) -> Box<dyn Any> {
        Box::new(input.parse::<bool>().unwrap_or(false))
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn can_serialize(&self) -> bool {
        self.serializable
    }
}

impl Var for CVar<String> {
    fn serialize(&self, val: &Box<dyn Any>) -> String {
        format!("\"{}\"", val.downcast_ref::<String>().unwrap())
    }

    fn deserialize(&self, input: &str) -> Box<dyn Any> {
        Box::new(input.trim_matches('"').to_owned())
    }

    fn description(&self) -> &'static str {
        self.description
    }
    fn can_serialize(&self) -> bool {
        self.serializable
    }
}

pub trait Var {
    fn serialize(&self, val: &Box<dyn Any>) -> String;
    fn deserialize(&self, input: &str) -> Box<dyn Any>;
    fn description(&self) -> &'static str;
    fn can_serialize(&self) -> bool;
}

pub struct Console {
    names: HashMap<String, &'static str>,
    vars: HashMap<&'static str, Box<dyn Var>>,
    var_values: HashMap<&'static str, Box<dyn Any>>,

    history: Vec<String>,
}

unsafe impl Send for Console {}

impl Default for Console {
    fn default() -> Self {
        Console::new()
    }
}

impl Console {
    pub fn new() -> Console {
        Console {
            names: HashMap::new(),
            vars: HashMap::new(),
            var_values: HashMap::new(),

            history: Vec::new(),
        }
    }

    pub fn register<T: Sized + Any>(&mut self, var: CVar<T>)
    where
        CVar<T>: Var,
    {
        if self.vars.contains_key(var.name) {
            panic!("Key registered twice {}", var.name);
        }
        self.names.insert(var.name.to_owned(), var.name);
        self.var_values.insert(var.name, Box::new((var.default)()));
        self.vars.insert(var.name, Box::new(var));
    }

    pub fn get<T: Sized + Any>(&self, var: CVar<T>) -> &T
    where
        CVar<T>: Var,
    {
        // Should never fail
        self.var_values
            .get(var.name)
            .unwrap()
            .downcast_ref::<T>()
            .unwrap()
    }

    pub fn set<T: Sized + Any>(&mut self, var: CVar<T>, val: T)
    where
        CVar<T>: Var,
    {
        self.var_values.insert(var.name, Box::new(val));
        self.save_config();
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn load_config(&mut self) {
        if let Ok(file) = fs::File::open("conf.cfg") {
            let reader = BufReader::new(file);
            for line in reader.lines() {
                let line = match line {
                    Ok(val) => val,
                    Err(_) => return,
                };
                self.apply_config_line(&line);
            }
        }
    }

    fn apply_config_line(&mut self, line: &str) {
        if line.starts_with('#') || line.is_empty() {
            return;
        }
        let parts = line
            .splitn(2, ' ')
            .map(|v| v.to_owned())
            .collect::<Vec<String>>();
        if parts.len() < 2 {
            return;
        }
        let (name, arg) = (&parts[0], &parts[1]);
        if let Some(&var_name) = self.names.get(name) {
            let var = self.vars.get(var_name).unwrap();
            let val = var.deserialize(arg);
            if var.can_serialize() {
                self.var_values.insert(var_name, val);
            }
        } else {
            println!("Missing prop");
        }
    }

    pub fn save_config(&self) {
        let mut file = BufWriter::new(fs::File::create("conf.cfg").unwrap());
        for (name, var) in &self.vars {
            if !var.can_serialize() {
                continue;
            }
            for line in var.description().lines() {
                writeln!(file, "# {}", line).unwrap();
            }
            writeln!(
                file,
                "{} {}\n",
                name,
                var.serialize(self.var_values.get(name).unwrap())
            )
            .unwrap();
        }
    }

    fn log(&mut self, record: &log::Record) {
        if let Some(path) = record.module_path() {
            for filtered in FILTERED_CRATES {
                if path.starts_with(filtered) {
                    return;
                }
            }
        }

        let mut file = record.file().unwrap_or("").replace('\\', "/");
        if let Some(pos) = file.rfind("src/") {
            file = file[pos + 4..].to_owned();
        }
        let line = record.line().unwrap_or(0);

        let msg = format!("[{}:{}][{}] {}", file, line, record.level(), record.args());
        println!("{}", msg);
        if self.history.len() >= 200 {
            self.history.remove(0);
        }
        self.history.push(msg);
    }
}

pub struct ConsoleProxy {
    console: Arc<Mutex<Console>>,
}

impl ConsoleProxy {
    pub fn new(con: Arc<Mutex<Console>>) -> ConsoleProxy {
        ConsoleProxy { console: con }
    }
}

impl log::Log for ConsoleProxy {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Trace
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.console.lock().unwrap().log(record);
        }
    }

    fn flush(&self) {}
}

unsafe impl Send for ConsoleProxy {}
unsafe impl Sync for ConsoleProxy {}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_VAR: CVar<i64> = CVar {
        ty: PhantomData,
        name: "test_var",
        description: "testing",
        mutable: true,
        serializable: false,
        default: &|| 42,
    };

    #[test]
    fn defaults_apply_on_register() {
        let mut con = Console::new();
        con.register(TEST_VAR);
        assert_eq!(*con.get(TEST_VAR), 42);
    }

    #[test]
    fn string_vars_round_trip_quotes() {
        let var = CVar::<String> {
            ty: PhantomData,
            name: "test_str",
            description: "testing",
            mutable: true,
            serializable: true,
            default: &|| "hello world".to_owned(),
        };
        let serialized = var.serialize(&(Box::new("hello world".to_owned()) as Box<dyn Any>));
        assert_eq!(serialized, "\"hello world\"");
        let back = var.deserialize(&serialized);
        assert_eq!(back.downcast_ref::<String>().unwrap(), "hello world");
    }

    #[test]
    fn config_lines_without_values_are_ignored() {
        const NAME_VAR: CVar<String> = CVar {
            ty: PhantomData,
            name: "cl_test_name",
            description: "testing",
            mutable: true,
            serializable: true,
            default: &|| "default".to_owned(),
        };
        let mut con = Console::new();
        con.register(NAME_VAR);

        // a bare token, a comment and an empty line all leave it alone
        con.apply_config_line("cl_test_name");
        con.apply_config_line("# cl_test_name \"commented\"");
        con.apply_config_line("");
        assert_eq!(*con.get(NAME_VAR), "default");

        con.apply_config_line("cl_test_name \"steve\"");
        assert_eq!(*con.get(NAME_VAR), "steve");
    }
}

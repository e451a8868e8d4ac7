//! Conversion between Lua values and JSON.

use mlua::{Lua, Result as LuaResult, Table, Value};

/// Convert a Lua value to a JSON value.
///
/// A table whose keys are all integers becomes an array; any other table
/// becomes an object. Functions and userdata become `null`.
pub fn lua_value_to_json(value: Value) -> LuaResult<serde_json::Value> {
    match value {
        Value::Nil => Ok(serde_json::Value::Null),
        Value::Boolean(b) => Ok(serde_json::Value::Bool(b)),
        Value::Integer(i) => Ok(serde_json::Value::Number(i.into())),
        Value::Number(n) => Ok(serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)),
        Value::String(s) => Ok(serde_json::Value::String(s.to_str()?.to_string())),
        Value::Table(t) => table_to_json(t),
        _ => Ok(serde_json::Value::Null),
    }
}

fn table_to_json(table: Table) -> LuaResult<serde_json::Value> {
    let is_array = table.raw_len() > 0 && table.clone().pairs::<i64, Value>().all(|r| r.is_ok());

    if is_array {
        let mut arr = Vec::with_capacity(table.raw_len());
        for value in table.sequence_values::<Value>() {
            arr.push(lua_value_to_json(value?)?);
        }
        return Ok(serde_json::Value::Array(arr));
    }

    let mut obj = serde_json::Map::new();
    for pair in table.pairs::<Value, Value>() {
        let (key, value) = pair?;
        let key = match key {
            Value::String(s) => s.to_str()?.to_string(),
            Value::Integer(i) => i.to_string(),
            _ => continue,
        };
        obj.insert(key, lua_value_to_json(value)?);
    }
    Ok(serde_json::Value::Object(obj))
}

/// Convert a JSON value to a Lua value.
pub fn json_to_lua_value(lua: &Lua, value: &serde_json::Value) -> LuaResult<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Nil),
        serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                Ok(n.as_f64().map(Value::Number).unwrap_or(Value::Nil))
            }
        }
        serde_json::Value::String(s) => Ok(Value::String(lua.create_string(s)?)),
        serde_json::Value::Array(arr) => {
            let table = lua.create_table()?;
            for (i, v) in arr.iter().enumerate() {
                table.set(i + 1, json_to_lua_value(lua, v)?)?;
            }
            Ok(Value::Table(table))
        }
        serde_json::Value::Object(obj) => {
            let table = lua.create_table()?;
            for (k, v) in obj {
                table.set(k.as_str(), json_to_lua_value(lua, v)?)?;
            }
            Ok(Value::Table(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lua_tables_to_json() {
        let lua = Lua::new();
        let value: Value = lua
            .load(r#"return { list = {1, 2.5, "three"}, flag = true, empty = {} }"#)
            .eval()
            .unwrap();
        let json = lua_value_to_json(value).unwrap();
        assert_eq!(json["list"], json!([1, 2.5, "three"]));
        assert_eq!(json["flag"], true);
        assert_eq!(json["empty"], json!({}));
    }

    #[test]
    fn test_json_reaches_lua_intact() {
        let lua = Lua::new();
        let config = json!({"scene": "Intro", "volume": 0.5, "tags": ["a", "b"]});
        lua.globals()
            .set("config", json_to_lua_value(&lua, &config).unwrap())
            .unwrap();
        let summary: String = lua
            .load(r#"return config.scene .. ":" .. config.volume .. ":" .. #config.tags"#)
            .eval()
            .unwrap();
        assert_eq!(summary, "Intro:0.5:2");
    }

    #[test]
    fn test_functions_become_null() {
        let lua = Lua::new();
        let value: Value = lua.load("return function() end").eval().unwrap();
        assert_eq!(lua_value_to_json(value).unwrap(), serde_json::Value::Null);
    }
}

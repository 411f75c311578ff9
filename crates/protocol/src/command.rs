use pastelite_common::CommandError;

use crate::{Frame, Parse};

/// Subconjunto de comandos que os backends de rede emitem.
///
/// O servidor de cache recebe estes comandos como arrays RESP; o KV gerenciado
/// recebe o mesmo vetor de argumentos como array JSON (ver [`Command::args`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping(Option<String>),
    Get(String),
    Set { key: String, value: String },
    Del(Vec<String>),
    Auth {
        username: Option<String>,
        password: String,
    },
    Select(i64),
}

impl Command {
    /// Faz o parse de um Frame em um Command.
    pub fn from_frame(frame: Frame) -> Result<Command, CommandError> {
        let mut parse = Parse::new(frame)?;
        let cmd_name = parse.next_string()?.to_uppercase();

        let cmd = match cmd_name.as_str() {
            "PING" => {
                let msg = if parse.has_remaining() {
                    Some(parse.next_string()?)
                } else {
                    None
                };
                Command::Ping(msg)
            }
            "GET" => Command::Get(parse.next_string()?),
            "SET" => {
                let key = parse.next_string()?;
                let value = parse.next_string()?;
                Command::Set { key, value }
            }
            "DEL" => {
                if !parse.has_remaining() {
                    return Err(CommandError::WrongArity("DEL".into()));
                }
                let mut keys = Vec::new();
                while parse.has_remaining() {
                    keys.push(parse.next_string()?);
                }
                Command::Del(keys)
            }
            "AUTH" => {
                let first = parse.next_string()?;
                if parse.has_remaining() {
                    Command::Auth {
                        username: Some(first),
                        password: parse.next_string()?,
                    }
                } else {
                    Command::Auth {
                        username: None,
                        password: first,
                    }
                }
            }
            "SELECT" => Command::Select(parse.next_int()?),
            _ => return Err(CommandError::Unknown(cmd_name)),
        };

        parse.finish()?;
        Ok(cmd)
    }

    /// Argumentos do comando, nome primeiro, na ordem do wire.
    pub fn args(&self) -> Vec<String> {
        match self {
            Command::Ping(None) => vec!["PING".into()],
            Command::Ping(Some(msg)) => vec!["PING".into(), msg.clone()],
            Command::Get(key) => vec!["GET".into(), key.clone()],
            Command::Set { key, value } => vec!["SET".into(), key.clone(), value.clone()],
            Command::Del(keys) => {
                let mut args = vec!["DEL".to_string()];
                args.extend(keys.iter().cloned());
                args
            }
            Command::Auth {
                username: Some(user),
                password,
            } => vec!["AUTH".into(), user.clone(), password.clone()],
            Command::Auth {
                username: None,
                password,
            } => vec!["AUTH".into(), password.clone()],
            Command::Select(db) => vec!["SELECT".into(), db.to_string()],
        }
    }

    /// Encoda o comando como Frame para envio via RESP.
    pub fn to_frame(&self) -> Frame {
        Frame::Array(self.args().iter().map(|arg| Frame::bulk(arg)).collect())
    }

    /// Nome do comando, para logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Ping(_) => "PING",
            Command::Get(_) => "GET",
            Command::Set { .. } => "SET",
            Command::Del(_) => "DEL",
            Command::Auth { .. } => "AUTH",
            Command::Select(_) => "SELECT",
        }
    }
}

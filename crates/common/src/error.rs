/// Erros de parsing do protocolo RESP.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("frame incompleto")]
    Incomplete,
    #[error("byte de tipo inválido: {0:#x}")]
    InvalidFrameType(u8),
    #[error("inteiro inválido: {0}")]
    InvalidInteger(String),
    #[error("comprimento de bulk inválido: {0}")]
    InvalidBulkLength(i64),
    #[error("frame excede tamanho máximo ({0} bytes)")]
    FrameTooLarge(usize),
    #[error("encoding inválido: {0}")]
    InvalidEncoding(String),
}

/// Erros de conexão TCP com o servidor de cache.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("conexão resetada pelo peer")]
    ConnectionReset,
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Erros de parsing/validação de comandos.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("comando desconhecido: {0}")]
    Unknown(String),
    #[error("número errado de argumentos para '{0}'")]
    WrongArity(String),
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
}

/// Erros de validação do corpo de criação. As mensagens vão direto para o cliente HTTP.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Content is required and must be a non-empty string")]
    MissingContent,
    #[error("ttl_seconds must be an integer >= 1")]
    InvalidTtl,
    #[error("ttl_seconds is too large")]
    TtlTooLarge,
    #[error("max_views must be an integer >= 1")]
    InvalidMaxViews,
}

/// Erros de backend de armazenamento.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("erro retornado pelo backend: {0}")]
    Remote(String),
    #[error("falha de transporte HTTP: {0}")]
    Http(String),
    #[error("resposta inesperada do backend: {0}")]
    UnexpectedReply(String),
    #[error("falha ao serializar entrada: {0}")]
    Encode(String),
    #[error("documento local ilegível: {0}")]
    CorruptDocument(String),
    #[error("configuração de backend inválida: {0}")]
    Config(String),
}

/// Erro top-level do pastelite.
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias.
pub type PasteResult<T> = Result<T, PasteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::Incomplete;
        assert_eq!(err.to_string(), "frame incompleto");
    }

    #[test]
    fn validation_messages_are_client_facing() {
        assert_eq!(ValidationError::InvalidJson.to_string(), "Invalid JSON");
        assert_eq!(
            ValidationError::InvalidTtl.to_string(),
            "ttl_seconds must be an integer >= 1"
        );
        assert_eq!(
            ValidationError::InvalidMaxViews.to_string(),
            "max_views must be an integer >= 1"
        );
    }

    #[test]
    fn store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn paste_error_wraps_store_and_validation() {
        let err: PasteError = StoreError::Remote("down".into()).into();
        assert!(matches!(err, PasteError::Store(StoreError::Remote(_))));

        let err: PasteError = ValidationError::TtlTooLarge.into();
        assert_eq!(err.to_string(), "ttl_seconds is too large");
    }

    #[test]
    fn command_error_display() {
        let err = CommandError::WrongArity("GET".into());
        assert_eq!(err.to_string(), "número errado de argumentos para 'GET'");
    }
}

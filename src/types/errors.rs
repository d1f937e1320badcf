//! Tipos de erro do polycache.

use thiserror::Error;

/// Tipo de resultado padrão do polycache.
pub type PolyCacheResult<T> = Result<T, PolyCacheError>;

/// Erros possíveis no polycache.
#[derive(Error, Debug)]
pub enum PolyCacheError {
    #[error("Capacidade de cache inválida {0}: deve ser pelo menos 1")]
    InvalidCapacity(usize),

    #[error("Erro ao derivar chave de cache: {0}")]
    KeyDerivation(String),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operação geométrica '{0}' falhou: {1}")]
    Geometry(String, String),

    #[error("Erro ao inicializar logging: {0}")]
    Logging(String),

    #[error("{0}")]
    Other(String),
}

impl PolyCacheError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de geometria para a operação informada.
    pub fn geometry<O: Into<String>, S: Into<String>>(operation: O, msg: S) -> Self {
        Self::Geometry(operation.into(), msg.into())
    }
}

/// Element type tag written into raw-buffer headers by persistence code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl DType {
    pub const fn size_of(self) -> usize {
        match self {
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// One-byte tag used in model file headers.
    pub const fn code(self) -> u8 {
        match self {
            DType::Int32 => b'i',
            DType::Int64 => b'l',
            DType::Float32 => b'f',
            DType::Float64 => b'd',
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'i' => Some(DType::Int32),
            b'l' => Some(DType::Int64),
            b'f' => Some(DType::Float32),
            b'd' => Some(DType::Float64),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "int32" => Ok(DType::Int32),
            "int64" => Ok(DType::Int64),
            "float32" => Ok(DType::Float32),
            "float64" => Ok(DType::Float64),
            other => Err(format!("unknown dtype '{other}'")),
        }
    }
}

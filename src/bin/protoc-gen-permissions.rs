use std::io::{Error, ErrorKind, Read, Result, Write};

use log::trace;
use prost::Message;
use protoc_gen_permissions::descriptor::CodeGeneratorRequest;

fn main() {
    env_logger::init();

    if let Err(e) = faillible_main() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn faillible_main() -> Result<()> {
    let mut buf = Vec::new();
    std::io::stdin().read_to_end(&mut buf)?;

    let request = CodeGeneratorRequest::decode(buf.as_slice()).map_err(|error| {
        Error::new(
            ErrorKind::InvalidInput,
            protoc_gen_permissions::Error::from(error),
        )
    })?;
    trace!("{:#?}", request);

    let response = protoc_gen_permissions::compile_request(request);

    buf.clear();
    response
        .encode(&mut buf)
        .map_err(|error| Error::new(ErrorKind::Other, error))?;
    std::io::stdout().write_all(&buf)?;

    Ok(())
}

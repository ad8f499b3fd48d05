use std::env;
use std::fs;
use xmlview::{Document, XmlContext, XmlViewError, select_values, write_value};

/// Reads every node a path selects, or writes a value through it.
fn main() -> Result<(), XmlViewError> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 4 {
        eprintln!("Reads or writes the nodes an XPath path selects in an XML document.");
        eprintln!();
        eprintln!("Usage: {} <document.xml> <path> [value]", args[0]);
        eprintln!();
        eprintln!("Without a value, prints the string value of every match.");
        eprintln!("With a value, writes it to the single match, creating missing nodes,");
        eprintln!("and prints the resulting document.");
        std::process::exit(1);
    }

    let text = fs::read_to_string(&args[1])?;
    let mut doc = Document::parse(&text)?;
    let context = XmlContext::new();

    match args.get(3) {
        None => {
            for value in select_values(&doc, &args[2], &context)? {
                println!("{}", value);
            }
        }
        Some(value) => {
            write_value(&mut doc, &args[2], value, &context)?;
            println!("{}", doc.to_xml()?);
        }
    }
    Ok(())
}

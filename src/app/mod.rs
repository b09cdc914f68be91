mod previewer;

#[cfg(test)]
mod tests;

pub use previewer::Previewer;

pub mod dispatch;
pub mod output;

#[cfg(test)]
mod dispatch_test;

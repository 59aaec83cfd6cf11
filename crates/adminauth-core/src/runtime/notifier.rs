/// Surface for user-visible warnings (an alert dialog in a browser host)
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn alert(&self, message: &str) {
        (**self).alert(message)
    }
}
